/*!
 Data structures produced by the `typedstream` decoder.
*/

/// A class descriptor archived in the stream: its name and encoded version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    /// The name of the class
    pub name: String,
    /// The encoded version of the class
    pub version: u64,
}

impl Class {
    pub(crate) fn new(name: String, version: u64) -> Self {
        Self { name, version }
    }
}

/// A single decoded value.
///
/// `typedstream` data does not archive property names, so values are anonymous
/// and meaningful only by position within their record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text data
    String(String),
    /// Signed integers of any archived width, sign-extended
    SignedInteger(i64),
    /// Unsigned integers of any archived width, zero-extended
    UnsignedInteger(u64),
    /// Single-precision floats
    Float(f32),
    /// Double-precision floats
    Double(f64),
    /// A byte whose type encoding this decoder does not recognize
    Byte(u8),
    /// The contents of a fixed-length `[N]` array field
    Bytes(Vec<u8>),
    /// A class that appeared inline in a value list
    Class(Class),
}

/// One record reconstructed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Archivable {
    /// An instance of a class along with its instance data, in order of appearance
    Object(Class, Vec<Value>),
    /// A free-standing value list that is not attached to any class, for example
    /// the character range preceding an attribute run
    Data(Vec<Value>),
    /// A bare class appearance, usually one link of an inheritance chain
    Class(Class),
    /// A reserved slot in the objects table for an instance whose class chain has
    /// been read but whose data has not. Classes are archived root-last, so the
    /// slot holds the instance's position until its fields arrive.
    Placeholder,
    /// An embedded type list captured in the objects table so later
    /// back-references can resolve it. Never emitted to callers.
    Type(Vec<Type>),
}

impl Archivable {
    /// Extract user-visible text from an archived `NSString` or `NSMutableString`.
    ///
    /// Attributed-string archives store attribute-key metadata (for example
    /// `__kIMMessagePartAttributeName`) in string objects right next to the
    /// message text. Those keys are suppressed here so callers that only want the
    /// text a person typed can filter on this accessor alone; see the caveats on
    /// the substring checks below.
    ///
    /// # Example
    ///
    /// ```
    /// use typedstream::util::typedstream::models::{Archivable, Class, Value};
    ///
    /// let text = Archivable::Object(
    ///     Class {
    ///         name: "NSString".to_string(),
    ///         version: 1,
    ///     },
    ///     vec![Value::String("Hello world".to_string())],
    /// );
    /// assert_eq!(text.string_value(), Some("Hello world"));
    ///
    /// let attribute_key = Archivable::Object(
    ///     Class {
    ///         name: "NSString".to_string(),
    ///         version: 1,
    ///     },
    ///     vec![Value::String("__kIMMessagePartAttributeName".to_string())],
    /// );
    /// assert_eq!(attribute_key.string_value(), None);
    /// ```
    pub fn string_value(&self) -> Option<&str> {
        if let Archivable::Object(Class { name, .. }, values) = self {
            if name == "NSString" || name == "NSMutableString" {
                if let Some(Value::String(text)) = values.first() {
                    // Heuristic, not wire format: drops Apple-internal attribute
                    // keys, at the cost of any user text containing "NS" or
                    // "Attribute"
                    if !text.starts_with("__k")
                        && !text.contains("Attribute")
                        && !text.contains("NS")
                        && text.chars().any(char::is_alphanumeric)
                    {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    /// Extract the integer payload of an archived `NSNumber`
    pub fn integer_value(&self) -> Option<i64> {
        if let Archivable::Object(Class { name, .. }, values) = self {
            if name == "NSNumber" {
                if let Some(Value::SignedInteger(value)) = values.first() {
                    return Some(*value);
                }
            }
        }
        None
    }

    /// Extract the double payload of an archived `NSNumber`
    pub fn double_value(&self) -> Option<f64> {
        if let Archivable::Object(Class { name, .. }, values) = self {
            if name == "NSNumber" {
                if let Some(Value::Double(value)) = values.first() {
                    return Some(*value);
                }
            }
        }
        None
    }
}

/// One symbol of a type-encoding string, describing a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Length-prefixed UTF-8 text, `+` (`0x2B`)
    Utf8String,
    /// Bytes that open a nested record, `*` (`0x2A`)
    EmbeddedData,
    /// An instance of a class, `@` (`0x40`)
    Object,
    /// A signed integer: `c`, `i`, `l`, `q`, or `s`; the width is announced by
    /// the value's prefix byte, not the encoding
    SignedInt,
    /// An unsigned integer: `C`, `I`, `L`, `Q`, or `S`
    UnsignedInt,
    /// A single-precision float, `f` (`0x66`)
    Float,
    /// A double-precision float, `d` (`0x64`)
    Double,
    /// An interned literal, reused when a class-name slot is read back as a type
    String(String),
    /// A fixed-length array of raw bytes, encoded as braced digits like `[52c]`
    Array(usize),
    /// An encoding byte this decoder does not recognize
    Unknown(u8),
}

impl Type {
    /// Map one type-encoding byte to its symbol
    pub(crate) fn from_byte(byte: u8) -> Self {
        match byte {
            b'@' => Self::Object,
            b'+' => Self::Utf8String,
            b'*' => Self::EmbeddedData,
            b'f' => Self::Float,
            b'd' => Self::Double,
            b'c' | b'i' | b'l' | b'q' | b's' => Self::SignedInt,
            b'C' | b'I' | b'L' | b'Q' | b'S' => Self::UnsignedInt,
            other => Self::Unknown(other),
        }
    }

    /// Parse the length out of a `[N…]` array encoding.
    ///
    /// Returns `None` when the encoding does not open with `[`, has no digits,
    /// or names a zero-length array.
    pub(crate) fn array_length(encoding: &[u8]) -> Option<usize> {
        let body = encoding.strip_prefix(b"[")?;
        let end = body
            .iter()
            .position(|byte| !byte.is_ascii_digit())
            .unwrap_or(body.len());
        let length = std::str::from_utf8(&body[..end]).ok()?.parse::<usize>().ok()?;
        (length > 0).then_some(length)
    }
}

/// The outcome of reading a class from the stream
#[derive(Debug)]
pub(crate) enum ClassResult {
    /// A back-reference to a row of the objects table
    Index(usize),
    /// A newly read inheritance chain, ordered leaf to root
    ClassHierarchy(Vec<Archivable>),
}
