//! Typed-keys dispatch for named aggregate results.
//!
//! Responses requested with `typed_keys` name each aggregate result as
//! `kind#name` (for example `sterms#by_tag`). The kind selects the decoder
//! from a closed registry; the name becomes the key in the destination map.

use std::collections::BTreeMap;

use tracing::debug;

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::primitives::{Reader, Writer};
use crate::codec::{Encode, JsonEnum};
use crate::error::{DecodeError, EncodeError};
use crate::limits::TYPED_KEYS_SEPARATOR;
use crate::model::aggregate::{Aggregate, AggregateKind};

/// Splits a typed key into `(kind, name)` at the first separator.
///
/// A key without a separator names both the kind and the result.
pub fn split_typed_key(key: &str) -> (&str, &str) {
    match key.split_once(TYPED_KEYS_SEPARATOR) {
        Some((kind, name)) => (kind, name),
        None => (key, key),
    }
}

/// Decodes one typed-key member into its result name and value.
pub fn decode_typed_aggregate<'a>(key: &'a str, reader: &mut Reader<'a>) -> Result<(String, Aggregate), DecodeError> {
    let (kind, name) = split_typed_key(key);
    debug!(kind, name, "dispatching typed key");
    let aggregate = Aggregate::decode_kind(kind, reader)?;
    Ok((name.to_string(), aggregate))
}

/// Reads an object of typed-key members into a map of named results.
///
/// Names are unique per level; when two keys share a name (`avg#x`, `max#x`)
/// the later member replaces the earlier one.
pub fn read_aggregate_map(reader: &mut Reader<'_>) -> Result<BTreeMap<String, Aggregate>, DecodeError> {
    let mut out = BTreeMap::new();
    reader.read_object(|key, reader| {
        let (name, aggregate) = decode_typed_aggregate(key, reader)?;
        out.insert(name, aggregate);
        Ok(())
    })?;
    Ok(out)
}

/// Writes named results as members of the currently open object.
pub fn write_aggregate_members(writer: &mut Writer, aggregations: &BTreeMap<String, Aggregate>) -> Result<(), EncodeError> {
    for (name, aggregate) in aggregations {
        writer.key(typed_key(writer.options(), aggregate.kind(), name))?;
        aggregate.encode(writer)?;
    }
    Ok(())
}

/// Writes named results as an object.
pub fn write_aggregate_map(writer: &mut Writer, aggregations: &BTreeMap<String, Aggregate>) -> Result<(), EncodeError> {
    writer.begin_object()?;
    write_aggregate_members(writer, aggregations)?;
    writer.end_object()
}

fn typed_key(options: &EncodeOptions, kind: AggregateKind, name: &str) -> String {
    if options.typed_keys {
        format!("{}{}{}", kind.json_value(), TYPED_KEYS_SEPARATOR, name)
    } else {
        name.to_string()
    }
}

/// Decodes the `aggregations` object of a search response.
pub fn decode_aggregations(input: &str) -> Result<BTreeMap<String, Aggregate>, DecodeError> {
    decode_aggregations_with_options(input, DecodeOptions::default())
}

/// Decodes the `aggregations` object of a search response with custom options.
pub fn decode_aggregations_with_options(
    input: &str,
    options: DecodeOptions,
) -> Result<BTreeMap<String, Aggregate>, DecodeError> {
    if input.len() > options.max_input_len {
        return Err(DecodeError::LengthExceedsLimit {
            field: "input",
            len: input.len(),
            max: options.max_input_len,
        });
    }
    let value: serde_json::Value = serde_json::from_str(input)?;
    read_aggregate_map(&mut Reader::with_options(&value, options))
}

/// Encodes named results as a typed-keys `aggregations` object.
pub fn encode_aggregations(aggregations: &BTreeMap<String, Aggregate>) -> Result<String, EncodeError> {
    encode_aggregations_with_options(aggregations, EncodeOptions::default())
}

/// Encodes named results with custom options.
pub fn encode_aggregations_with_options(
    aggregations: &BTreeMap<String, Aggregate>,
    options: EncodeOptions,
) -> Result<String, EncodeError> {
    let mut writer = Writer::with_options(options);
    write_aggregate_map(&mut writer, aggregations)?;
    writer.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::prelude::*;

    #[test]
    fn test_split_typed_key() {
        assert_eq!(split_typed_key("sterms#by_tag"), ("sterms", "by_tag"));
        assert_eq!(split_typed_key("avg#a#b"), ("avg", "a#b"));
        assert_eq!(split_typed_key("avg"), ("avg", "avg"));
    }

    #[test]
    fn test_decode_aggregations() {
        let input = r#"{"avg#latency": {"value": 12.5}, "cardinality#users": {"value": 7}}"#;
        let aggregations = decode_aggregations(input).unwrap();
        assert_eq!(aggregations.len(), 2);
        assert_eq!(aggregations["latency"].avg().unwrap().value(), 12.5);
        assert_eq!(aggregations["users"].cardinality().unwrap().value(), 7);
    }

    #[test]
    fn test_duplicate_name_keeps_last_member() {
        let input = r#"{"avg#x": {"value": 1}, "max#x": {"value": 9}}"#;
        let aggregations = decode_aggregations(input).unwrap();
        assert_eq!(aggregations.len(), 1);
        assert_eq!(aggregations["x"].max().unwrap().value(), 9.0);
        assert!(aggregations["x"].avg().is_err());
    }

    #[test]
    fn test_unrecognized_kind() {
        let err = decode_aggregations(r#"{"bogus_kind#x": {}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
        assert!(matches!(
            &err,
            DecodeError::UnrecognizedKind { kind, path } if kind == "bogus_kind" && path == "$.bogus_kind#x"
        ));
    }

    #[test]
    fn test_encode_with_and_without_typed_keys() {
        let aggregations = decode_aggregations(r#"{"max#top": {"value": 3}}"#).unwrap();
        assert_eq!(encode_aggregations(&aggregations).unwrap(), r#"{"max#top":{"value":3}}"#);
        let plain = encode_aggregations_with_options(&aggregations, EncodeOptions::new().with_typed_keys(false)).unwrap();
        assert_eq!(plain, r#"{"top":{"value":3}}"#);
    }
}
