/*!
 Bounds-checked reads over the raw byte stream.

 The cursor owns no interning state; it only knows how to pull primitives out of
 the buffer. Widths are not fixed in a `typedstream`: integers announce their
 size with a prefix byte, so every numeric read returns the widest Rust type.
*/

use crate::{
    error::typedstream::TypedStreamError,
    util::typedstream::{DECIMAL, END, I_16, I_32, REFERENCE_TAG},
};

/// A monotonically advancing position in a `typedstream` buffer.
///
/// Reads advance the position; peeks do not. Every access is bounds-checked and
/// fails with [`TypedStreamError::OutOfBounds`] rather than panicking.
#[derive(Debug)]
pub struct StreamCursor<'a> {
    /// The raw bytes being decoded
    stream: &'a [u8],
    /// The current position in the stream
    idx: usize,
}

impl<'a> StreamCursor<'a> {
    pub(crate) fn new(stream: &'a [u8]) -> Self {
        Self { stream, idx: 0 }
    }

    /// True while at least one unread byte remains
    pub(crate) fn has_remaining(&self) -> bool {
        self.idx < self.stream.len()
    }

    /// Get the byte at an arbitrary index, if it is inside the stream
    fn at(&self, byte_idx: usize) -> Result<u8, TypedStreamError> {
        self.stream
            .get(byte_idx)
            .copied()
            .ok_or(TypedStreamError::OutOfBounds(byte_idx, self.stream.len()))
    }

    /// The byte under the cursor
    pub(crate) fn current(&self) -> Result<u8, TypedStreamError> {
        self.at(self.idx)
    }

    /// The byte after the one under the cursor
    pub(crate) fn peek(&self) -> Result<u8, TypedStreamError> {
        self.at(self.idx + 1)
    }

    /// Step over one byte without interpreting it
    pub(crate) fn advance(&mut self) {
        self.idx += 1;
    }

    /// Read exactly `n` bytes, advancing past them
    pub(crate) fn read_exact(&mut self, n: usize) -> Result<&'a [u8], TypedStreamError> {
        let end = self.idx + n;
        let range = self
            .stream
            .get(self.idx..end)
            .ok_or(TypedStreamError::OutOfBounds(end, self.stream.len()))?;
        self.idx = end;
        Ok(range)
    }

    /// Read exactly `n` bytes as UTF-8 text
    pub(crate) fn read_utf8(&mut self, n: usize) -> Result<&'a str, TypedStreamError> {
        std::str::from_utf8(self.read_exact(n)?).map_err(TypedStreamError::StringParse)
    }

    /// Read a signed integer, sign-extended to 64 bits.
    ///
    /// The width comes from the prefix byte: none for one byte, [`I_16`] for two,
    /// [`I_32`] for four. A byte above [`REFERENCE_TAG`] that does not close the
    /// record is a repeated type tag (dictionaries emit these) and is skipped.
    pub(crate) fn read_signed_int(&mut self) -> Result<i64, TypedStreamError> {
        match self.current()? {
            I_16 => {
                self.advance();
                let value = i16::from_le_bytes(
                    self.read_exact(2)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                );
                Ok(i64::from(value))
            }
            I_32 => {
                self.advance();
                let value = i32::from_le_bytes(
                    self.read_exact(4)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                );
                Ok(i64::from(value))
            }
            byte => {
                if byte > REFERENCE_TAG && self.peek()? != END {
                    self.advance();
                    return self.read_signed_int();
                }
                self.advance();
                Ok(i64::from(byte as i8))
            }
        }
    }

    /// Read an unsigned integer, zero-extended to 64 bits
    pub(crate) fn read_unsigned_int(&mut self) -> Result<u64, TypedStreamError> {
        match self.current()? {
            I_16 => {
                self.advance();
                let value = u16::from_le_bytes(
                    self.read_exact(2)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                );
                Ok(u64::from(value))
            }
            I_32 => {
                self.advance();
                let value = u32::from_le_bytes(
                    self.read_exact(4)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                );
                Ok(u64::from(value))
            }
            byte => {
                self.advance();
                Ok(u64::from(byte))
            }
        }
    }

    /// Read a single-precision float.
    ///
    /// Small numeric fields may be archived as integers even when the field's
    /// type says float, so anything without the [`DECIMAL`] prefix falls back to
    /// the signed integer reader and converts.
    pub(crate) fn read_float(&mut self) -> Result<f32, TypedStreamError> {
        match self.current()? {
            DECIMAL => {
                self.advance();
                Ok(f32::from_le_bytes(
                    self.read_exact(4)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                ))
            }
            _ => Ok(self.read_signed_int()? as f32),
        }
    }

    /// Read a double-precision float, with the same integer fallback as [`StreamCursor::read_float`]
    pub(crate) fn read_double(&mut self) -> Result<f64, TypedStreamError> {
        match self.current()? {
            DECIMAL => {
                self.advance();
                Ok(f64::from_le_bytes(
                    self.read_exact(8)?
                        .try_into()
                        .map_err(TypedStreamError::SliceError)?,
                ))
            }
            _ => Ok(self.read_signed_int()? as f64),
        }
    }
}
