//! The `Percentiles` tagged union.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, JsonKind, Member, ObjectCodec, Reader, TaggedUnion, Writer, decode_union};
use crate::error::{BuildError, DecodeError, EncodeError, VariantMismatch};
use crate::model::builder::{SingleUse, require};
use crate::model::FieldValue;

/// Percentile results, keyed by percent (`{"50.0": 12.5}`) or as an array
/// of items (`[{"key": 50.0, "value": 12.5}]`).
#[derive(Debug, Clone, PartialEq)]
pub enum Percentiles {
    Keyed(BTreeMap<String, FieldValue>),
    Array(Vec<ArrayPercentilesItem>),
}

impl Percentiles {
    pub fn is_keyed(&self) -> bool {
        matches!(self, Percentiles::Keyed(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Percentiles::Array(_))
    }

    pub fn keyed(&self) -> Result<&BTreeMap<String, FieldValue>, VariantMismatch> {
        match self {
            Percentiles::Keyed(map) => Ok(map),
            Percentiles::Array(_) => Err(self.mismatch("keyed")),
        }
    }

    pub fn array(&self) -> Result<&[ArrayPercentilesItem], VariantMismatch> {
        match self {
            Percentiles::Array(items) => Ok(items),
            Percentiles::Keyed(_) => Err(self.mismatch("array")),
        }
    }
}

impl TaggedUnion for Percentiles {
    const UNION_NAME: &'static str = "Percentiles";

    fn variant_tag(&self) -> &'static str {
        match self {
            Percentiles::Keyed(_) => "keyed",
            Percentiles::Array(_) => "array",
        }
    }
}

impl Encode for Percentiles {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        match self {
            Percentiles::Keyed(map) => writer.write_string_map(map),
            Percentiles::Array(items) => writer.write_slice(items),
        }
    }
}

const PERCENTILES_MEMBERS: &[Member<Percentiles>] = &[
    Member {
        tag: "keyed",
        accepts: &[JsonKind::Object],
        decode: |r| r.read_string_map(FieldValue::decode).map(Percentiles::Keyed),
    },
    Member {
        tag: "array",
        accepts: &[JsonKind::Array],
        decode: |r| r.read_vec(ArrayPercentilesItem::decode).map(Percentiles::Array),
    },
];

impl Decode for Percentiles {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        decode_union(Self::UNION_NAME, PERCENTILES_MEMBERS, reader)
    }
}

// =============================================================================
// ARRAY ITEM
// =============================================================================

/// One percentile in the array form.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPercentilesItem {
    key: String,
    value: Option<f64>,
    value_as_string: Option<String>,
}

impl ArrayPercentilesItem {
    pub fn builder() -> ArrayPercentilesItemBuilder {
        ArrayPercentilesItemBuilder::new()
    }

    /// The percent, as rendered by the server (`"99.0"`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The percentile value; absent when the server reported `null`.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn value_as_string(&self) -> Option<&str> {
        self.value_as_string.as_deref()
    }
}

/// Builder for [`ArrayPercentilesItem`].
#[derive(Debug, Clone, Default)]
pub struct ArrayPercentilesItemBuilder {
    guard: SingleUse,
    key: Option<String>,
    value: Option<f64>,
    value_as_string: Option<String>,
}

impl ArrayPercentilesItemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    pub fn value(&mut self, value: f64) -> &mut Self {
        self.value = Some(value);
        self
    }

    pub fn value_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.value_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<ArrayPercentilesItem, BuildError> {
        self.guard.consume("ArrayPercentilesItem")?;
        Ok(ArrayPercentilesItem {
            key: require(self.key.take(), "ArrayPercentilesItem", "key")?,
            value: self.value.take(),
            value_as_string: self.value_as_string.take(),
        })
    }
}

lazy_static! {
    static ref ARRAY_PERCENTILES_ITEM_CODEC: ObjectCodec<ArrayPercentilesItem, ArrayPercentilesItemBuilder> = {
        let mut codec = ObjectCodec::new(
            "ArrayPercentilesItem",
            ArrayPercentilesItemBuilder::new,
            ArrayPercentilesItemBuilder::build,
        );
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_field("key", &v.key),
            )
            .add(
                "value",
                |b, r| {
                    if let Some(value) = r.read_nullable(|r| r.read_f64())? {
                        b.value(value);
                    }
                    Ok(())
                },
                |v, w| w.write_optional_field("value", v.value.as_ref()),
            )
            .add(
                "value_as_string",
                |b, r| {
                    b.value_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("value_as_string", v.value_as_string.as_ref()),
            );
        codec
    };
}

impl Encode for ArrayPercentilesItem {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        ARRAY_PERCENTILES_ITEM_CODEC.encode(self, writer)
    }
}

impl Decode for ArrayPercentilesItem {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        ARRAY_PERCENTILES_ITEM_CODEC.decode(reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};

    #[test]
    fn test_keyed_percentiles() {
        let input = json!({"50.0": 12.5, "99.0": null});
        let decoded: Percentiles = decode_value(&input).unwrap();
        let keyed = decoded.keyed().unwrap();
        assert_eq!(keyed["50.0"], FieldValue::Double(12.5));
        assert_eq!(keyed["99.0"], FieldValue::Null);
        assert_eq!(encode_value(&decoded).unwrap(), input);
    }

    #[test]
    fn test_array_percentiles_numeric_keys() {
        let input = json!([{"key": 50.0, "value": 12.5}, {"key": 99.0, "value": null}]);
        let decoded: Percentiles = decode_value(&input).unwrap();
        let items = decoded.array().unwrap();
        assert_eq!(items[0].key(), "50.0");
        assert_eq!(items[0].value(), Some(12.5));
        assert_eq!(items[1].value(), None);
        assert_eq!(
            encode_value(&decoded).unwrap(),
            json!([{"key": "50.0", "value": 12.5}, {"key": "99.0"}])
        );
    }

    #[test]
    fn test_item_requires_key() {
        let err = decode_value::<ArrayPercentilesItem>(&json!({"value": 1.0})).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MissingRequiredField);
    }
}
