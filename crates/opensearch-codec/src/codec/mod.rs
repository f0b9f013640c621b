//! JSON encoding/decoding for OpenSearch API shapes.
//!
//! Input text is parsed once into a [`serde_json::Value`] and then walked
//! with a [`Reader`]. Output is assembled with a [`Writer`] and rendered at
//! the end. Value types implement [`Encode`] and [`Decode`], usually by
//! delegating to a static [`ObjectCodec`] table.

pub mod options;
pub mod primitives;
pub mod table;
pub mod typed_keys;
pub mod union;

use std::io::{self, Read};

use serde_json::Value;
use tracing::trace;

use crate::error::{DecodeError, EncodeError};

pub use options::{DecodeOptions, EncodeOptions};
pub use primitives::{JsonKind, Reader, Writer};
pub use table::{ExtensionSlot, FieldBinding, ObjectCodec, ReadFn, ReadUnknownFn, WriteFn};
pub use typed_keys::{decode_aggregations, encode_aggregations, split_typed_key};
pub use union::{Member, TaggedUnion, decode_union};

/// A type that writes itself as one JSON value.
pub trait Encode {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError>;
}

/// A type that reads itself from the reader's current JSON value.
pub trait Decode: Sized {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError>;
}

/// A closed set of string constants with fixed wire names.
pub trait JsonEnum: Sized + Copy + 'static {
    /// Name of the enum, used in errors.
    const NAME: &'static str;
    /// Every member, in declaration order.
    const VARIANTS: &'static [Self];

    /// Canonical wire name.
    fn json_value(&self) -> &'static str;

    /// Additional names accepted on decode.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Looks a member up by wire name or alias.
    fn from_json_value(value: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.json_value() == value || v.aliases().contains(&value))
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a value from an already parsed JSON tree.
pub fn decode_value<T: Decode>(value: &Value) -> Result<T, DecodeError> {
    decode_value_with_options(value, DecodeOptions::default())
}

/// Decodes a value from an already parsed JSON tree with custom options.
pub fn decode_value_with_options<T: Decode>(value: &Value, options: DecodeOptions) -> Result<T, DecodeError> {
    let mut reader = Reader::with_options(value, options);
    T::decode(&mut reader)
}

/// Decodes a value from JSON text.
pub fn decode_str<T: Decode>(input: &str) -> Result<T, DecodeError> {
    decode_str_with_options(input, DecodeOptions::default())
}

/// Decodes a value from JSON text with custom options.
pub fn decode_str_with_options<T: Decode>(input: &str, options: DecodeOptions) -> Result<T, DecodeError> {
    decode_slice_with_options(input.as_bytes(), options)
}

/// Decodes a value from UTF-8 JSON bytes.
pub fn decode_slice<T: Decode>(input: &[u8]) -> Result<T, DecodeError> {
    decode_slice_with_options(input, DecodeOptions::default())
}

/// Decodes a value from UTF-8 JSON bytes with custom options.
pub fn decode_slice_with_options<T: Decode>(input: &[u8], options: DecodeOptions) -> Result<T, DecodeError> {
    check_input_len(input.len(), &options)?;
    trace!(len = input.len(), "decoding JSON input");
    let value: Value = serde_json::from_slice(input)?;
    decode_value_with_options(&value, options)
}

/// Decodes a value from a byte stream, reading at most `max_input_len` bytes.
pub fn decode_reader<T: Decode, R: io::Read>(reader: R) -> Result<T, DecodeError> {
    decode_reader_with_options(reader, DecodeOptions::default())
}

/// Decodes a value from a byte stream with custom options.
pub fn decode_reader_with_options<T: Decode, R: io::Read>(
    reader: R,
    options: DecodeOptions,
) -> Result<T, DecodeError> {
    let mut input = Vec::new();
    let limit = options.max_input_len as u64 + 1;
    reader
        .take(limit)
        .read_to_end(&mut input)
        .map_err(|err| DecodeError::Json(err.to_string()))?;
    decode_slice_with_options(&input, options)
}

fn check_input_len(len: usize, options: &DecodeOptions) -> Result<(), DecodeError> {
    if len > options.max_input_len {
        return Err(DecodeError::LengthExceedsLimit {
            field: "input",
            len,
            max: options.max_input_len,
        });
    }
    Ok(())
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a value into a JSON tree.
pub fn encode_value<T: Encode + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    encode_value_with_options(value, EncodeOptions::default())
}

/// Encodes a value into a JSON tree with custom options.
pub fn encode_value_with_options<T: Encode + ?Sized>(value: &T, options: EncodeOptions) -> Result<Value, EncodeError> {
    let mut writer = Writer::with_options(options);
    value.encode(&mut writer)?;
    writer.into_value()
}

/// Encodes a value as JSON text.
pub fn encode_string<T: Encode + ?Sized>(value: &T) -> Result<String, EncodeError> {
    encode_string_with_options(value, EncodeOptions::default())
}

/// Encodes a value as JSON text with custom options.
pub fn encode_string_with_options<T: Encode + ?Sized>(value: &T, options: EncodeOptions) -> Result<String, EncodeError> {
    let mut writer = Writer::with_options(options);
    value.encode(&mut writer)?;
    let text = writer.into_string()?;
    trace!(len = text.len(), "encoded JSON output");
    Ok(text)
}

/// Encodes a value as JSON text into a byte sink.
pub fn encode_writer<T: Encode + ?Sized, W: io::Write>(value: &T, out: W) -> Result<(), EncodeError> {
    encode_writer_with_options(value, out, EncodeOptions::default())
}

/// Encodes a value as JSON text into a byte sink with custom options.
pub fn encode_writer_with_options<T: Encode + ?Sized, W: io::Write>(
    value: &T,
    out: W,
    options: EncodeOptions,
) -> Result<(), EncodeError> {
    let tree = encode_value_with_options(value, options)?;
    if options.pretty {
        serde_json::to_writer_pretty(out, &tree)?;
    } else {
        serde_json::to_writer(out, &tree)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_str::<i64>("42").unwrap(), 42);
        assert_eq!(decode_str::<String>("\"a\"").unwrap(), "a");
        assert_eq!(decode_slice::<bool>(b"true").unwrap(), true);
    }

    #[test]
    fn test_decode_reader() {
        let input = std::io::Cursor::new(b" \"by_tag\" ".to_vec());
        assert_eq!(decode_reader::<String, _>(input).unwrap(), "by_tag");
    }

    #[test]
    fn test_malformed_input() {
        let err = decode_str::<i64>("{").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_input_length_limit() {
        let options = DecodeOptions::default().with_max_input_len(4);
        let err = decode_str_with_options::<String>("\"abcdef\"", options).unwrap_err();
        assert!(matches!(err, DecodeError::LengthExceedsLimit { len: 8, max: 4, .. }));

        let err = decode_reader_with_options::<String, _>(&b"\"abcdef\""[..], options).unwrap_err();
        assert!(matches!(err, DecodeError::LengthExceedsLimit { len: 5, max: 4, .. }));
    }

    #[test]
    fn test_encode_writer() {
        let mut out = Vec::new();
        encode_writer(&2.5f64, &mut out).unwrap();
        assert_eq!(out, b"2.5");
    }
}
