/*!
 Errors emitted by this crate, one module per failure domain.
*/

pub mod table;
pub mod typedstream;
