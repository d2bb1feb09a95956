/*!
 Contains logic and data structures used to decode `typedstream` data into native Rust data structures.

 ## Overview

 `typedstream` is the binary serialization protocol NeXTSTEP introduced for `C` and
 `Objective-C` object graphs; Apple's Foundation framework later adopted it for
 `NSArchiver`/`NSUnarchiver`. Archived objects carry no property names: the stream
 interleaves type-encoding strings, class inheritance chains, and field values, and
 refers back to previously seen types and classes by table index.

 The [`TypedStreamDecoder`](crate::util::typedstream::decoder::TypedStreamDecoder)
 reconstructs the graph in a single pass over an in-memory buffer, emitting a flat
 sequence of [`Archivable`](crate::util::typedstream::models::Archivable) records.

 ## Format notes

 The format is undocumented outside of reverse-engineering notes; behavior here was
 derived from the `typedstream` sources published at:
   - [`typedstream.h`](https://opensource.apple.com/source/gcc/gcc-1493/libobjc/objc/typedstream.h.auto.html)
   - [`archive.c`](https://opensource.apple.com/source/gcc/gcc-5484/libobjc/archive.c.auto.html)
*/

pub mod cursor;
pub mod decoder;
pub mod models;
mod tests;

/// Prefix for a little-endian 2-byte integer
pub(crate) const I_16: u8 = 0x81;
/// Prefix for a little-endian 4-byte integer
pub(crate) const I_32: u8 = 0x82;
/// Prefix for a raw [`f32`] or [`f64`]; the field's type encoding determines the width
pub(crate) const DECIMAL: u8 = 0x83;
/// Opens an object, a class inheritance chain, or embedded data
pub(crate) const START: u8 = 0x84;
/// Null marker, for example the end of a class inheritance chain
pub(crate) const EMPTY: u8 = 0x85;
/// Closes the current record
pub(crate) const END: u8 = 0x86;
/// Bytes at or above this value resolve to an index in one of the interning tables
pub(crate) const REFERENCE_TAG: u8 = 0x92;
