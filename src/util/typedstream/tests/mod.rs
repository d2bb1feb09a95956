#[cfg(test)]
mod test_decoder;
