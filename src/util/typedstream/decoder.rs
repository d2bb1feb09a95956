/*!
 Single-pass decoder for version 4 `streamtyped` archives.

 The grammar is context-sensitive on prior input: the first appearance of a type
 list or class is spelled out literally, and every later appearance is a single
 byte indexing a table of what has already been seen. The decoder therefore
 carries two append-only interning tables for the duration of one call, one for
 type lists and one for archived objects, and resolves reference bytes against
 whichever table the surrounding context calls for.
*/

use std::collections::HashSet;

use crate::{
    error::typedstream::TypedStreamError,
    util::typedstream::{
        cursor::StreamCursor,
        models::{Archivable, Class, ClassResult, Type, Value},
        EMPTY, END, REFERENCE_TAG, START,
    },
};

/// The `typedstream` version this decoder understands
const SUPPORTED_VERSION: u64 = 4;
/// The signature string the header must carry
const SIGNATURE: &str = "streamtyped";
/// The system version macOS and iOS emit
const SYSTEM_VERSION: i64 = 1000;

/// Decodes a `typedstream` buffer into a flat sequence of [`Archivable`] records.
///
/// One decoder owns one buffer reference, a cursor, and the two interning
/// tables; nothing is shared, so decoders on disjoint buffers are independent.
/// The tables are discarded when [`TypedStreamDecoder::decode`] returns.
///
/// # Example:
///
/// ```
/// use typedstream::util::typedstream::decoder::TypedStreamDecoder;
///
/// let bytes: Vec<u8> = vec![]; // An `attributedBody` blob
/// let mut decoder = TypedStreamDecoder::new(&bytes);
/// let result = decoder.decode();
/// ```
#[derive(Debug)]
pub struct TypedStreamDecoder<'a> {
    /// Read position in the buffer being decoded
    cursor: StreamCursor<'a>,
    /// Every type list seen so far, in order of first appearance
    types: Vec<Vec<Type>>,
    /// Every archivable seen so far: class chains, embedded types, and the
    /// reserved slots of objects under construction
    objects: Vec<Archivable>,
    /// Types-table rows already captured into the objects table through an
    /// embedded context; each row is captured at most once
    embedded_rows: HashSet<usize>,
    /// Objects-table index reserved for the object currently being assembled
    placeholder: Option<usize>,
}

impl<'a> TypedStreamDecoder<'a> {
    /// Construct a decoder over a buffer of `typedstream` bytes
    pub fn new(stream: &'a [u8]) -> Self {
        Self {
            cursor: StreamCursor::new(stream),
            types: vec![],
            objects: vec![],
            embedded_rows: HashSet::new(),
            placeholder: None,
        }
    }

    /// Decode the full stream.
    ///
    /// The output is the ordered sequence of top-level records. Any malformed
    /// region aborts the call with an error; there is no partial-result
    /// recovery.
    ///
    /// # Sample output:
    /// ```txt
    /// Object(Class { name: "NSMutableString", version: 1 }, [String("Example")]) // The message text
    /// Data([SignedInteger(1), UnsignedInteger(7)])  // Range of characters the next record applies to
    /// Object(Class { name: "NSDictionary", version: 0 }, [SignedInteger(1)])  // An attribute dictionary with one entry
    /// Object(Class { name: "NSString", version: 1 }, [String("__kIMMessagePartAttributeName")])  // The entry's key
    /// Object(Class { name: "NSNumber", version: 0 }, [SignedInteger(0)])  // The entry's value
    /// ```
    pub fn decode(&mut self) -> Result<Vec<Archivable>, TypedStreamError> {
        self.validate_header()?;

        let mut archive = vec![];
        while self.cursor.has_remaining() {
            if self.cursor.current()? == END {
                self.cursor.advance();
                continue;
            }

            if let Some(types) = self.read_type_list(false)? {
                if let Some(record) = self.read_values(types)? {
                    archive.push(record);
                }
            }
        }

        Ok(archive)
    }

    /// Reject anything other than the version 4 `streamtyped` header.
    ///
    /// The original format had several header variants; only the one macOS and
    /// iOS write is accepted here.
    pub(crate) fn validate_header(&mut self) -> Result<(), TypedStreamError> {
        let version = self.cursor.read_unsigned_int()?;
        let signature = self.read_string()?;
        let system_version = self.cursor.read_signed_int()?;

        if version != SUPPORTED_VERSION || signature != SIGNATURE || system_version != SYSTEM_VERSION
        {
            return Err(TypedStreamError::InvalidHeader);
        }

        Ok(())
    }

    /// Read a length-prefixed UTF-8 string
    fn read_string(&mut self) -> Result<String, TypedStreamError> {
        let length = self.cursor.read_unsigned_int()?;
        Ok(self.cursor.read_utf8(length as usize)?.to_string())
    }

    /// Resolve the byte under the cursor as a table index
    fn read_pointer(&mut self) -> Result<usize, TypedStreamError> {
        let pointer = self.cursor.current()?;
        self.cursor.advance();
        pointer
            .checked_sub(REFERENCE_TAG)
            .map(usize::from)
            .ok_or(TypedStreamError::InvalidPointer(pointer))
    }

    /// Parse one type-encoding string into its symbols
    fn read_type_encoding(&mut self) -> Result<Vec<Type>, TypedStreamError> {
        let length = self.cursor.read_unsigned_int()?;
        let encoding = self.cursor.read_exact(length as usize)?;

        // The `[N]` array form is one field, not N of them
        if encoding.first() == Some(&b'[') {
            let size = Type::array_length(encoding).ok_or(TypedStreamError::InvalidArray)?;
            return Ok(vec![Type::Array(size)]);
        }

        Ok(encoding.iter().map(|byte| Type::from_byte(*byte)).collect())
    }

    /// Get the type list governing the next record, either literally from the
    /// stream or by back-reference into the types table.
    ///
    /// Embedded contexts additionally capture the list into the objects table
    /// the first time the row is visited, so later object back-references can
    /// land on it.
    fn read_type_list(&mut self, embedded: bool) -> Result<Option<Vec<Type>>, TypedStreamError> {
        match self.cursor.current()? {
            START => {
                self.cursor.advance();
                let types = self.read_type_encoding()?;
                self.types.push(types.clone());

                if embedded && self.embedded_rows.insert(self.types.len() - 1) {
                    self.objects.push(Archivable::Type(types.clone()));
                }
                Ok(Some(types))
            }
            // End of the current record; the top-level loop steps over it
            END => Ok(None),
            _ => {
                // Repeated type tags, for example in a dict, collapse to one
                while self.cursor.current()? == self.cursor.peek()? {
                    self.cursor.advance();
                }

                let pointer = self.cursor.current()?;
                let row = self.read_pointer()?;
                let types = self
                    .types
                    .get(row)
                    .cloned()
                    .ok_or(TypedStreamError::InvalidPointer(pointer))?;

                if embedded && self.embedded_rows.insert(row) {
                    self.objects.push(Archivable::Type(types.clone()));
                }
                Ok(Some(types))
            }
        }
    }

    /// Walk a class inheritance chain.
    ///
    /// A chain is a run of `name + version` pairs, current class first, closed
    /// by an [`EMPTY`] byte; each class name is also interned into the types
    /// table. Already-seen classes arrive as a back-reference instead, either as
    /// a bare pointer byte or as a length at or above [`REFERENCE_TAG`].
    fn read_class(&mut self) -> Result<ClassResult, TypedStreamError> {
        let mut hierarchy = vec![];
        match self.cursor.current()? {
            START => {
                while self.cursor.current()? == START {
                    self.cursor.advance();
                }

                let length = self.cursor.read_unsigned_int()?;
                if length >= u64::from(REFERENCE_TAG) {
                    return Ok(ClassResult::Index((length - u64::from(REFERENCE_TAG)) as usize));
                }

                let name = self.cursor.read_utf8(length as usize)?.to_string();
                let version = self.cursor.read_unsigned_int()?;

                self.types.push(vec![Type::String(name.clone())]);
                hierarchy.push(Archivable::Class(Class::new(name, version)));

                if let ClassResult::ClassHierarchy(parents) = self.read_class()? {
                    hierarchy.extend(parents);
                }
            }
            EMPTY => self.cursor.advance(),
            _ => {
                return Ok(ClassResult::Index(self.read_pointer()?));
            }
        }
        Ok(ClassResult::ClassHierarchy(hierarchy))
    }

    /// Read the object in the next position: a new class chain to intern, or a
    /// back-reference to something already in the objects table
    fn read_object(&mut self) -> Result<Option<Archivable>, TypedStreamError> {
        match self.cursor.current()? {
            START => {
                match self.read_class()? {
                    ClassResult::Index(row) => return self.object_at(row).map(Some),
                    ClassResult::ClassHierarchy(classes) => {
                        self.objects.extend(classes);
                    }
                }
                Ok(None)
            }
            EMPTY => {
                self.cursor.advance();
                Ok(None)
            }
            _ => {
                let pointer = self.cursor.current()?;
                let row = self.read_pointer()?;
                self.objects
                    .get(row)
                    .cloned()
                    .map(Some)
                    .ok_or(TypedStreamError::InvalidPointer(pointer))
            }
        }
    }

    /// Look up an objects-table row, reconstructing the wire byte for the error
    fn object_at(&self, row: usize) -> Result<Archivable, TypedStreamError> {
        self.objects
            .get(row)
            .cloned()
            .ok_or(TypedStreamError::InvalidPointer(
                (row as u8).wrapping_add(REFERENCE_TAG),
            ))
    }

    /// Decode a nested record announced by an `EmbeddedData` field
    fn read_embedded_data(&mut self) -> Result<Option<Archivable>, TypedStreamError> {
        if self.cursor.current()? != START {
            return Err(TypedStreamError::InvalidHeader);
        }
        self.cursor.advance();

        match self.read_type_list(true)? {
            Some(types) => self.read_values(types),
            None => Ok(None),
        }
    }

    /// Read the values one type list describes and assemble them into a record.
    ///
    /// An `Object` field reserves a placeholder row before its class chain is
    /// read, because the chain must be interned ahead of the instance data it
    /// belongs to. Once the loop finishes, the placeholder is resolved: filled
    /// with a finished object, kept open while the instance's data is still to
    /// come, or downgraded to free-standing data when no class claimed it.
    fn read_values(&mut self, types: Vec<Type>) -> Result<Option<Archivable>, TypedStreamError> {
        let mut values = vec![];
        let mut is_object = false;

        for found_type in types {
            match found_type {
                Type::Utf8String => values.push(Value::String(self.read_string()?)),
                Type::EmbeddedData => {
                    if let Some(record) = self.read_embedded_data()? {
                        return Ok(Some(record));
                    }
                }
                Type::Object => {
                    is_object = true;
                    self.placeholder = Some(self.objects.len());
                    self.objects.push(Archivable::Placeholder);

                    if let Some(archived) = self.read_object()? {
                        match archived {
                            Archivable::Object(class, data) => {
                                // A prior appearance already filled this object;
                                // hand it back instead of assembling a new one
                                if !data.is_empty() {
                                    self.placeholder = None;
                                    self.objects.pop();
                                    return Ok(Some(Archivable::Object(class, data)));
                                }
                                values.push(Value::Class(class));
                            }
                            Archivable::Class(class) => values.push(Value::Class(class)),
                            Archivable::Data(data) => values.extend(data),
                            // Table-internal rows never contribute values
                            Archivable::Placeholder | Archivable::Type(_) => {}
                        }
                    }
                }
                Type::SignedInt => {
                    values.push(Value::SignedInteger(self.cursor.read_signed_int()?));
                }
                Type::UnsignedInt => {
                    values.push(Value::UnsignedInteger(self.cursor.read_unsigned_int()?));
                }
                Type::Float => values.push(Value::Float(self.cursor.read_float()?)),
                Type::Double => values.push(Value::Double(self.cursor.read_double()?)),
                Type::Unknown(byte) => values.push(Value::Byte(byte)),
                Type::String(text) => values.push(Value::String(text)),
                Type::Array(size) => values.push(Value::Bytes(self.cursor.read_exact(size)?.to_vec())),
            }
        }

        if let Some(reserved) = self.placeholder {
            if !values.is_empty() {
                if let Some(Value::Class(class)) = values.last() {
                    // The class arrived but its data is in a later record; keep
                    // the slot open for it
                    self.objects[reserved] = Archivable::Object(class.clone(), vec![]);
                } else if let Some(Archivable::Class(class)) = self.objects.get(reserved + 1) {
                    // The row after the slot is the head of the chain this data
                    // belongs to
                    let filled = Archivable::Object(class.clone(), values);
                    self.objects[reserved] = filled.clone();
                    self.placeholder = None;
                    return Ok(Some(filled));
                } else if let Some(Archivable::Object(_, data)) = self.objects.get_mut(reserved) {
                    // Data arriving for a class seen earlier
                    data.extend(values);
                    self.placeholder = None;
                    return Ok(self.objects.get(reserved).cloned());
                } else {
                    // No class claimed the data; it belongs to the enclosing
                    // object under a name the archive never stored
                    let free = Archivable::Data(values);
                    self.objects[reserved] = free.clone();
                    self.placeholder = None;
                    return Ok(Some(free));
                }
            }
        }

        if !values.is_empty() && !is_object {
            return Ok(Some(Archivable::Data(values)));
        }
        Ok(None)
    }
}
