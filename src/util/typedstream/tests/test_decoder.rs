#[cfg(test)]
mod decoder_tests {
    use crate::{
        error::typedstream::TypedStreamError,
        util::typedstream::{
            decoder::TypedStreamDecoder,
            models::{Archivable, Class, Value},
        },
    };

    /// Prefix a stream body with the version 4 `streamtyped` header
    fn with_header(body: &[u8]) -> Vec<u8> {
        let mut stream = vec![0x04, 0x0B];
        stream.extend_from_slice(b"streamtyped");
        stream.extend_from_slice(&[0x81, 0xE8, 0x03]);
        stream.extend_from_slice(body);
        stream
    }

    /// An attributed-string archive for the message "Hello" with a single
    /// attribute run, laid out the way macOS archives an `attributedBody`:
    /// root object, mutable string, run range, attribute dictionary, then the
    /// dictionary's contents, with every repeated type and class arriving as a
    /// back-reference.
    fn attributed_hello() -> Vec<u8> {
        let mut body: Vec<u8> = vec![];

        // Root object: the NSAttributedString class chain, data to follow
        body.extend_from_slice(&[0x84, 0x01, 0x40]);
        body.extend_from_slice(&[0x84, 0x84, 0x84, 0x12]);
        body.extend_from_slice(b"NSAttributedString");
        body.extend_from_slice(&[0x00, 0x84, 0x84, 0x08]);
        body.extend_from_slice(b"NSObject");
        body.extend_from_slice(&[0x00, 0x85]);

        // The string object, its class new, its parent a back-reference
        body.extend_from_slice(&[0x92]);
        body.extend_from_slice(&[0x84, 0x84, 0x84, 0x08]);
        body.extend_from_slice(b"NSString");
        body.extend_from_slice(&[0x01, 0x94]);

        // The string's data
        body.extend_from_slice(&[0x84, 0x01, 0x2B, 0x05]);
        body.extend_from_slice(b"Hello");
        body.extend_from_slice(&[0x86]);

        // Attribute run range: one run, nine characters
        body.extend_from_slice(&[0x84, 0x02, 0x69, 0x49, 0x01, 0x09]);

        // The attribute dictionary, then its entry count
        body.extend_from_slice(&[0x92]);
        body.extend_from_slice(&[0x84, 0x84, 0x84, 0x0C]);
        body.extend_from_slice(b"NSDictionary");
        body.extend_from_slice(&[0x00, 0x94]);
        body.extend_from_slice(&[0x84, 0x01, 0x69, 0x01]);

        // An NSNumber, its payload (-1) archived as embedded data
        body.extend_from_slice(&[0x92]);
        body.extend_from_slice(&[0x84, 0x84, 0x84, 0x08]);
        body.extend_from_slice(b"NSNumber");
        body.extend_from_slice(&[0x00, 0x84, 0x84, 0x07]);
        body.extend_from_slice(b"NSValue");
        body.extend_from_slice(&[0x00, 0x94]);
        body.extend_from_slice(&[0x84, 0x01, 0x2A, 0x84, 0x84, 0x01, 0x63, 0xFF, 0x86]);

        // An attribute key: the NSString class and the string's type list are
        // both back-references now
        body.extend_from_slice(&[0x92, 0x96]);
        body.extend_from_slice(&[0x96, 0x1D]);
        body.extend_from_slice(b"__kIMMessagePartAttributeName");
        body.extend_from_slice(&[0x86]);

        // A second NSNumber (0), through the same embedded type row
        body.extend_from_slice(&[0x92, 0x9A]);
        body.extend_from_slice(&[0x9C, 0x84, 0x9D, 0x00]);
        body.extend_from_slice(&[0x86, 0x86]);

        with_header(&body)
    }

    #[test]
    fn can_validate_header() {
        let stream = with_header(&[]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(decoder.validate_header().is_ok());
    }

    #[test]
    fn header_only_stream_decodes_to_nothing() {
        let stream = with_header(&[]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert_eq!(decoder.decode().unwrap(), vec![]);
    }

    #[test]
    fn can_decode_attributed_string() {
        let stream = attributed_hello();
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        let expected = vec![
            Archivable::Object(
                Class {
                    name: "NSString".to_string(),
                    version: 1,
                },
                vec![Value::String("Hello".to_string())],
            ),
            Archivable::Data(vec![Value::SignedInteger(1), Value::UnsignedInteger(9)]),
            Archivable::Object(
                Class {
                    name: "NSDictionary".to_string(),
                    version: 0,
                },
                vec![Value::SignedInteger(1)],
            ),
            Archivable::Object(
                Class {
                    name: "NSNumber".to_string(),
                    version: 0,
                },
                vec![Value::SignedInteger(-1)],
            ),
            Archivable::Object(
                Class {
                    name: "NSString".to_string(),
                    version: 1,
                },
                vec![Value::String("__kIMMessagePartAttributeName".to_string())],
            ),
            Archivable::Object(
                Class {
                    name: "NSNumber".to_string(),
                    version: 0,
                },
                vec![Value::SignedInteger(0)],
            ),
        ];

        assert_eq!(result, expected);
    }

    #[test]
    fn string_accessor_keeps_only_user_text() {
        let stream = attributed_hello();
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();
        let text: Vec<&str> = result
            .iter()
            .filter_map(Archivable::string_value)
            .collect();

        assert_eq!(text, vec!["Hello"]);
    }

    #[test]
    fn interned_classes_resolve_to_their_first_appearance() {
        let stream = attributed_hello();
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        // The attribute key's class arrived as a back-reference and must be the
        // same descriptor the message text carried
        let (first, second) = (&result[0], &result[4]);
        match (first, second) {
            (Archivable::Object(text_class, _), Archivable::Object(key_class, _)) => {
                assert_eq!(text_class, key_class);
            }
            _ => panic!("expected objects, got {first:?} and {second:?}"),
        }

        // Likewise for the two NSNumber values
        match (&result[3], &result[5]) {
            (Archivable::Object(minus_one, _), Archivable::Object(zero, _)) => {
                assert_eq!(minus_one, zero);
            }
            _ => panic!("expected objects"),
        }
    }

    #[test]
    fn internal_table_rows_are_never_emitted() {
        let stream = attributed_hello();
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert!(!result
            .iter()
            .any(|record| matches!(record, Archivable::Placeholder | Archivable::Type(_))));
    }

    #[test]
    fn can_decode_bare_data_record() {
        let stream = with_header(&[0x84, 0x02, 0x69, 0x49, 0x02, 0x03]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(
            result,
            vec![Archivable::Data(vec![
                Value::SignedInteger(2),
                Value::UnsignedInteger(3)
            ])]
        );
    }

    #[test]
    fn can_decode_negative_one_before_end_marker() {
        let stream = with_header(&[0x84, 0x01, 0x69, 0xFF, 0x86]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(result, vec![Archivable::Data(vec![Value::SignedInteger(-1)])]);
    }

    #[test]
    fn repeated_type_tags_collapse_to_one() {
        // The same type row referenced twice in a row reads a single record
        let stream = with_header(&[0x84, 0x01, 0x69, 0x05, 0x92, 0x92, 0x07]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(
            result,
            vec![
                Archivable::Data(vec![Value::SignedInteger(5)]),
                Archivable::Data(vec![Value::SignedInteger(7)]),
            ]
        );
    }

    #[test]
    fn data_for_an_already_seen_class_lands_on_its_object() {
        // A class whose interned name row is later read back as a type list;
        // the string it yields fills the object reserved for that class
        let mut body = vec![0x84, 0x01, 0x40];
        body.extend_from_slice(&[0x84, 0x84, 0x03]);
        body.extend_from_slice(b"ABC");
        body.extend_from_slice(&[0x01, 0x85, 0x93, 0x86]);
        let stream = with_header(&body);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(
            result,
            vec![Archivable::Object(
                Class {
                    name: "ABC".to_string(),
                    version: 1,
                },
                vec![Value::String("ABC".to_string())],
            )]
        );
    }

    #[test]
    fn can_decode_fixed_length_array() {
        let mut body = vec![0x84, 0x05];
        body.extend_from_slice(b"[32c]");
        body.extend_from_slice(&[0xAB; 32]);
        let stream = with_header(&body);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(result, vec![Archivable::Data(vec![Value::Bytes(vec![0xAB; 32])])]);
    }

    #[test]
    fn array_without_digits_is_invalid() {
        let mut body = vec![0x84, 0x03];
        body.extend_from_slice(b"[c]");
        let stream = with_header(&body);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidArray)
        ));
    }

    #[test]
    fn zero_length_array_is_invalid() {
        let mut body = vec![0x84, 0x04];
        body.extend_from_slice(b"[0c]");
        let stream = with_header(&body);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidArray)
        ));
    }

    #[test]
    fn unrecognized_type_byte_passes_through() {
        let stream = with_header(&[0x84, 0x01, 0x76]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(result, vec![Archivable::Data(vec![Value::Byte(0x76)])]);
    }

    #[test]
    fn can_decode_float_and_double_fields() {
        let mut body = vec![0x84, 0x02, 0x66, 0x64];
        body.extend_from_slice(&[0x83, 0x00, 0x00, 0xC0, 0x3F]);
        body.extend_from_slice(&[0x83, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8, 0x3F]);
        let stream = with_header(&body);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(
            result,
            vec![Archivable::Data(vec![Value::Float(1.5), Value::Double(1.5)])]
        );
    }

    #[test]
    fn float_field_archived_as_integer_converts() {
        let stream = with_header(&[0x84, 0x01, 0x66, 0x05]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        let result = decoder.decode().unwrap();

        assert_eq!(result, vec![Archivable::Data(vec![Value::Float(5.0)])]);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut stream = with_header(&[]);
        stream[0] = 0x03;
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidHeader)
        ));
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut stream = with_header(&[]);
        stream[2] = b'x';
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidHeader)
        ));
    }

    #[test]
    fn rejects_wrong_system_version() {
        let mut stream = with_header(&[]);
        stream[14] = 0xE9;
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidHeader)
        ));
    }

    #[test]
    fn empty_input_is_out_of_bounds() {
        let mut decoder = TypedStreamDecoder::new(&[]);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::OutOfBounds(_, 0))
        ));
    }

    #[test]
    fn pointer_below_reference_tag_is_invalid() {
        // In an object position
        let stream = with_header(&[0x84, 0x01, 0x40, 0x90]);
        let mut decoder = TypedStreamDecoder::new(&stream);
        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidPointer(0x90))
        ));

        // In a type position
        let stream = with_header(&[0x90, 0x86]);
        let mut decoder = TypedStreamDecoder::new(&stream);
        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidPointer(0x90))
        ));
    }

    #[test]
    fn pointer_to_a_missing_row_is_invalid() {
        // References row 1 of the types table before anything is interned
        let stream = with_header(&[0x93, 0x86]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidPointer(0x93))
        ));
    }

    #[test]
    fn embedded_data_must_open_with_start_byte() {
        let stream = with_header(&[0x84, 0x01, 0x2A, 0x00]);
        let mut decoder = TypedStreamDecoder::new(&stream);

        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::InvalidHeader)
        ));
    }

    #[test]
    fn truncation_never_yields_a_short_read_silently() {
        let stream = attributed_hello();

        // Cutting inside the message text must fail loudly
        let text_at = stream
            .windows(5)
            .position(|window| window == b"Hello")
            .unwrap();
        let mut decoder = TypedStreamDecoder::new(&stream[..text_at + 2]);
        assert!(matches!(
            decoder.decode(),
            Err(TypedStreamError::OutOfBounds(_, _))
        ));

        // Any truncation either errors with a bounds/pointer/string failure or
        // stops exactly on a record boundary; nothing else is acceptable
        for end in 0..stream.len() {
            let mut decoder = TypedStreamDecoder::new(&stream[..end]);
            if let Err(why) = decoder.decode() {
                assert!(
                    matches!(
                        why,
                        TypedStreamError::OutOfBounds(_, _)
                            | TypedStreamError::StringParse(_)
                            | TypedStreamError::InvalidPointer(_)
                    ),
                    "unexpected error at offset {end}: {why:?}"
                );
            }
        }
    }
}
