/*!
 Errors that can happen when decoding `typedstream` data.
*/

use std::{
    array::TryFromSliceError,
    fmt::{Display, Formatter, Result},
    str::Utf8Error,
};

/// Errors that can happen when decoding `typedstream` data
#[derive(Debug)]
pub enum TypedStreamError {
    /// The cursor would have to move past the end of the stream to satisfy a read;
    /// carries the requested index and the stream length
    OutOfBounds(usize, usize),
    /// The stream does not open with the version 4 `streamtyped` header
    InvalidHeader,
    /// A length-prefixed slice was not valid UTF-8
    StringParse(Utf8Error),
    /// A `[length]` type encoding had no digits or a zero length
    InvalidArray,
    /// A back-reference byte could not be resolved against an interning table
    InvalidPointer(u8),
    /// A fixed-width read could not be converted into its primitive
    SliceError(TryFromSliceError),
}

impl Display for TypedStreamError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            TypedStreamError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of stream length {len:x}!")
            }
            TypedStreamError::InvalidHeader => write!(fmt, "Invalid typedstream header!"),
            TypedStreamError::StringParse(why) => {
                write!(fmt, "Failed to decode string data: {why}")
            }
            TypedStreamError::InvalidArray => write!(fmt, "Failed to parse array length!"),
            TypedStreamError::InvalidPointer(byte) => {
                write!(fmt, "Failed to resolve reference pointer {byte:x}!")
            }
            TypedStreamError::SliceError(why) => {
                write!(fmt, "Unable to slice source stream: {why}")
            }
        }
    }
}
