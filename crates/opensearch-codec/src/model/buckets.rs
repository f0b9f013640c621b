//! The `Buckets` tagged union.
//!
//! Multi-bucket results list their buckets either as an array or, when the
//! request set `keyed`, as an object of named buckets. Filter definitions on
//! requests use the same two shapes.

use std::collections::BTreeMap;

use crate::codec::{Decode, Encode, JsonKind, Member, Reader, TaggedUnion, Writer, decode_union};
use crate::error::{DecodeError, EncodeError, VariantMismatch};

/// Buckets as an object of named items or as an array of items.
#[derive(Debug, Clone, PartialEq)]
pub enum Buckets<T> {
    Keyed(BTreeMap<String, T>),
    Array(Vec<T>),
}

impl<T> Buckets<T> {
    pub fn is_keyed(&self) -> bool {
        matches!(self, Buckets::Keyed(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Buckets::Array(_))
    }

    /// Returns the named buckets, failing if the buckets are an array.
    pub fn keyed(&self) -> Result<&BTreeMap<String, T>, VariantMismatch> {
        match self {
            Buckets::Keyed(map) => Ok(map),
            Buckets::Array(_) => Err(self.mismatch("keyed")),
        }
    }

    /// Returns the bucket list, failing if the buckets are keyed.
    pub fn array(&self) -> Result<&[T], VariantMismatch> {
        match self {
            Buckets::Array(items) => Ok(items),
            Buckets::Keyed(_) => Err(self.mismatch("array")),
        }
    }

    /// Number of buckets in either shape.
    pub fn len(&self) -> usize {
        match self {
            Buckets::Keyed(map) => map.len(),
            Buckets::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over buckets in either shape; keyed buckets come in key order.
    pub fn values(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        match self {
            Buckets::Keyed(map) => Box::new(map.values()),
            Buckets::Array(items) => Box::new(items.iter()),
        }
    }
}

impl<T> TaggedUnion for Buckets<T> {
    const UNION_NAME: &'static str = "Buckets";

    fn variant_tag(&self) -> &'static str {
        match self {
            Buckets::Keyed(_) => "keyed",
            Buckets::Array(_) => "array",
        }
    }
}

impl<T> From<Vec<T>> for Buckets<T> {
    fn from(items: Vec<T>) -> Self {
        Buckets::Array(items)
    }
}

impl<T> From<BTreeMap<String, T>> for Buckets<T> {
    fn from(map: BTreeMap<String, T>) -> Self {
        Buckets::Keyed(map)
    }
}

impl<T: Encode> Encode for Buckets<T> {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        match self {
            Buckets::Keyed(map) => writer.write_string_map(map),
            Buckets::Array(items) => writer.write_slice(items),
        }
    }
}

impl<T: Decode> Decode for Buckets<T> {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let members = [
            Member {
                tag: "keyed",
                accepts: &[JsonKind::Object],
                decode: |r| r.read_string_map(T::decode).map(Buckets::Keyed),
            },
            Member {
                tag: "array",
                accepts: &[JsonKind::Array],
                decode: |r| r.read_vec(T::decode).map(Buckets::Array),
            },
        ];
        decode_union(Self::UNION_NAME, &members, reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;

    #[test]
    fn test_array_round_trip() {
        let original = vec!["a".to_string(), "b".to_string()];
        let buckets = Buckets::Array(original.clone());
        let value = encode_value(&buckets).unwrap();
        assert_eq!(value, json!(["a", "b"]));

        let decoded: Buckets<String> = decode_value(&value).unwrap();
        assert!(decoded.is_array());
        assert_eq!(decoded.array().unwrap(), original.as_slice());
        let err = decoded.keyed().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VariantMismatch);
        assert_eq!((err.requested, err.actual), ("keyed", "array"));
    }

    #[test]
    fn test_keyed_round_trip() {
        let mut original = BTreeMap::new();
        original.insert("low".to_string(), 1i64);
        original.insert("high".to_string(), 2i64);
        let value = encode_value(&Buckets::Keyed(original.clone())).unwrap();

        let decoded: Buckets<i64> = decode_value(&value).unwrap();
        assert!(decoded.is_keyed());
        assert_eq!(decoded.keyed().unwrap(), &original);
        assert!(decoded.array().is_err());
        assert_eq!(decoded.values().copied().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_scalar_is_no_matching_variant() {
        let err = decode_value::<Buckets<i64>>(&json!(3)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::NoMatchingVariant { union: "Buckets", found: JsonKind::Number, .. }
        ));
    }

    #[test]
    fn test_bad_element_keeps_its_error() {
        let err = decode_value::<Buckets<i64>>(&json!([1, "x"])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber { .. }));
        assert_eq!(err.path(), Some("$[1]"));
    }
}
