//! Tagged-union decoding by trial.
//!
//! Unions such as `Buckets` carry no discriminant key: the variant is implied
//! by the JSON shape. Each member declares the JSON kinds it accepts and a
//! decoder. Members whose kinds match are tried in declared order against the
//! same buffered value, and the first success wins. When the shape selects a
//! single member, that member's error is returned as is.

use tracing::debug;

use crate::codec::primitives::{JsonKind, Reader};
use crate::error::{DecodeError, VariantMismatch};

/// One candidate of a tagged union.
pub struct Member<T> {
    /// Wire name of the variant, used in diagnostics.
    pub tag: &'static str,
    /// JSON kinds this candidate can possibly decode.
    pub accepts: &'static [JsonKind],
    pub decode: for<'a> fn(&mut Reader<'a>) -> Result<T, DecodeError>,
}

/// Decodes the current value as the first member that accepts it.
///
/// `NoMatchingVariant` is returned when no member accepts the JSON kind, or
/// when several do and all of them fail.
pub fn decode_union<T>(
    union: &'static str,
    members: &[Member<T>],
    reader: &mut Reader<'_>,
) -> Result<T, DecodeError> {
    let found = reader.kind();
    let candidates: Vec<&Member<T>> = members.iter().filter(|m| m.accepts.contains(&found)).collect();
    if let [only] = candidates.as_slice() {
        return (only.decode)(reader);
    }
    for member in candidates {
        match (member.decode)(reader) {
            Ok(value) => return Ok(value),
            Err(err) => {
                debug!(union, variant = member.tag, path = %reader.path(), error = %err, "union candidate rejected");
            }
        }
    }
    Err(DecodeError::NoMatchingVariant {
        union,
        found,
        path: reader.path(),
    })
}

/// A sum type whose variants have wire names.
pub trait TaggedUnion {
    /// Name of the union, used in errors.
    const UNION_NAME: &'static str;

    /// Wire name of the stored variant.
    fn variant_tag(&self) -> &'static str;

    /// Builds the error for an accessor that asked for `requested`.
    fn mismatch(&self, requested: &'static str) -> VariantMismatch {
        VariantMismatch {
            union: Self::UNION_NAME,
            requested,
            actual: self.variant_tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, PartialEq)]
    enum Shape {
        Whole(i64),
        Fraction(f64),
        Words(Vec<String>),
    }

    const SHAPE_MEMBERS: &[Member<Shape>] = &[
        Member {
            tag: "whole",
            accepts: &[JsonKind::Number, JsonKind::String],
            decode: |r| r.read_i64().map(Shape::Whole),
        },
        Member {
            tag: "fraction",
            accepts: &[JsonKind::Number, JsonKind::String],
            decode: |r| r.read_f64().map(Shape::Fraction),
        },
        Member {
            tag: "words",
            accepts: &[JsonKind::Array],
            decode: |r| r.read_vec(|r| r.read_string()).map(Shape::Words),
        },
    ];

    fn decode(value: serde_json::Value) -> Result<Shape, DecodeError> {
        decode_union("Shape", SHAPE_MEMBERS, &mut Reader::new(&value))
    }

    #[test]
    fn test_first_success_wins() {
        assert_eq!(decode(json!(4)).unwrap(), Shape::Whole(4));
        assert_eq!(decode(json!(4.5)).unwrap(), Shape::Fraction(4.5));
        assert_eq!(decode(json!("2.5")).unwrap(), Shape::Fraction(2.5));
        assert_eq!(
            decode(json!(["a", "b"])).unwrap(),
            Shape::Words(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_no_matching_variant() {
        let err = decode(json!({"a": 1})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVariant);
        assert!(matches!(
            err,
            DecodeError::NoMatchingVariant { union: "Shape", found: JsonKind::Object, .. }
        ));

        let err = decode(json!("nope")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::NoMatchingVariant { found: JsonKind::String, .. }
        ));
    }

    #[test]
    fn test_single_candidate_error_is_kept() {
        let err = decode(json!(["a", {"b": 1}])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(matches!(err, DecodeError::UnexpectedType { ref path, .. } if path == "$[1]"));
    }
}
