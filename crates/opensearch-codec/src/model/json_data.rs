//! Shared scalar and opaque value types.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::{Decode, Encode, JsonEnum, JsonKind, Member, Reader, TaggedUnion, Writer, decode_union};
use crate::error::{DecodeError, EncodeError, VariantMismatch};

// =============================================================================
// JSON DATA
// =============================================================================

/// Arbitrary JSON carried through untouched (`meta`, filter queries).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonData(Value);

impl JsonData {
    /// Wraps a JSON value.
    pub fn new(value: Value) -> Self {
        JsonData(value)
    }

    /// Converts any serializable value.
    pub fn from_serde<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(JsonData)
    }

    /// Converts the data into a deserializable type.
    pub fn to<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.0.clone())
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for JsonData {
    fn from(value: Value) -> Self {
        JsonData(value)
    }
}

impl From<JsonData> for Value {
    fn from(data: JsonData) -> Self {
        data.0
    }
}

impl fmt::Display for JsonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Encode for JsonData {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_json(&self.0)
    }
}

impl Decode for JsonData {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(JsonData(reader.read_json()))
    }
}

// =============================================================================
// FIELD VALUE
// =============================================================================

/// A scalar as found in documents: `missing` values, percentile results.
///
/// The variant follows the JSON syntax: integral numbers that fit in an
/// `i64` are `Long`, every other number is `Double`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(_))
    }

    pub fn is_long(&self) -> bool {
        matches!(self, FieldValue::Long(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, FieldValue::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, FieldValue::String(_))
    }

    pub fn bool(&self) -> Result<bool, VariantMismatch> {
        match self {
            FieldValue::Bool(b) => Ok(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    pub fn long(&self) -> Result<i64, VariantMismatch> {
        match self {
            FieldValue::Long(v) => Ok(*v),
            _ => Err(self.mismatch("long")),
        }
    }

    pub fn double(&self) -> Result<f64, VariantMismatch> {
        match self {
            FieldValue::Double(v) => Ok(*v),
            _ => Err(self.mismatch("double")),
        }
    }

    pub fn string(&self) -> Result<&str, VariantMismatch> {
        match self {
            FieldValue::String(s) => Ok(s),
            _ => Err(self.mismatch("string")),
        }
    }

    /// Numeric view of `Long` and `Double` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Long(v) => Some(*v as f64),
            FieldValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl TaggedUnion for FieldValue {
    const UNION_NAME: &'static str = "FieldValue";

    fn variant_tag(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Long(_) => "long",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Long(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl Encode for FieldValue {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        match self {
            FieldValue::Null => writer.write_null(),
            FieldValue::Bool(b) => writer.write_bool(*b),
            FieldValue::Long(v) => writer.write_i64(*v),
            FieldValue::Double(v) => writer.write_f64_exact(*v),
            FieldValue::String(s) => writer.write_str(s),
        }
    }
}

impl Decode for FieldValue {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let members = [
            Member {
                tag: "null",
                accepts: &[JsonKind::Null],
                decode: |_| Ok(FieldValue::Null),
            },
            Member {
                tag: "boolean",
                accepts: &[JsonKind::Bool],
                decode: |r| r.read_bool().map(FieldValue::Bool),
            },
            Member {
                tag: "long",
                accepts: &[JsonKind::Number],
                decode: |r| match r.value().as_i64() {
                    Some(v) => Ok(FieldValue::Long(v)),
                    None => Err(r.unexpected("integer")),
                },
            },
            Member {
                tag: "double",
                accepts: &[JsonKind::Number],
                decode: |r| r.read_f64().map(FieldValue::Double),
            },
            Member {
                tag: "string",
                accepts: &[JsonKind::String],
                decode: |r| r.read_string().map(FieldValue::String),
            },
        ];
        decode_union(FieldValue::UNION_NAME, &members, reader)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl JsonEnum for SortOrder {
    const NAME: &'static str = "SortOrder";
    const VARIANTS: &'static [Self] = &[SortOrder::Asc, SortOrder::Desc];

    fn json_value(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl Encode for SortOrder {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_enum(*self)
    }
}

impl Decode for SortOrder {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_enum()
    }
}

/// Calendar-aware bucket width for `date_histogram`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarInterval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl JsonEnum for CalendarInterval {
    const NAME: &'static str = "CalendarInterval";
    const VARIANTS: &'static [Self] = &[
        CalendarInterval::Minute,
        CalendarInterval::Hour,
        CalendarInterval::Day,
        CalendarInterval::Week,
        CalendarInterval::Month,
        CalendarInterval::Quarter,
        CalendarInterval::Year,
    ];

    fn json_value(&self) -> &'static str {
        match self {
            CalendarInterval::Minute => "minute",
            CalendarInterval::Hour => "hour",
            CalendarInterval::Day => "day",
            CalendarInterval::Week => "week",
            CalendarInterval::Month => "month",
            CalendarInterval::Quarter => "quarter",
            CalendarInterval::Year => "year",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            CalendarInterval::Minute => &["1m"],
            CalendarInterval::Hour => &["1h"],
            CalendarInterval::Day => &["1d"],
            CalendarInterval::Week => &["1w"],
            CalendarInterval::Month => &["1M"],
            CalendarInterval::Quarter => &["1q"],
            CalendarInterval::Year => &["1y"],
        }
    }
}

impl Encode for CalendarInterval {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_enum(*self)
    }
}

impl Decode for CalendarInterval {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_enum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_string};
    use crate::error::ErrorKind;

    #[test]
    fn test_field_value_variants_follow_syntax() {
        assert_eq!(decode_value::<FieldValue>(&json!(null)).unwrap(), FieldValue::Null);
        assert_eq!(decode_value::<FieldValue>(&json!(7)).unwrap(), FieldValue::Long(7));
        assert_eq!(decode_value::<FieldValue>(&json!(7.0)).unwrap(), FieldValue::Double(7.0));
        assert_eq!(
            decode_value::<FieldValue>(&json!("7")).unwrap(),
            FieldValue::String("7".into())
        );
        let err = decode_value::<FieldValue>(&json!([1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVariant);
    }

    #[test]
    fn test_field_value_double_keeps_float_form() {
        assert_eq!(encode_string(&FieldValue::Double(7.0)).unwrap(), "7.0");
        assert_eq!(encode_string(&FieldValue::Long(7)).unwrap(), "7");
    }

    #[test]
    fn test_field_value_accessor_mismatch() {
        let value = FieldValue::Long(1);
        assert_eq!(value.long(), Ok(1));
        let err = value.string().unwrap_err();
        assert_eq!(err.requested, "string");
        assert_eq!(err.actual, "long");
    }

    #[test]
    fn test_calendar_interval_aliases() {
        assert_eq!(
            decode_value::<CalendarInterval>(&json!("1d")).unwrap(),
            CalendarInterval::Day
        );
        assert_eq!(encode_string(&CalendarInterval::Day).unwrap(), "\"day\"");
        let err = decode_value::<CalendarInterval>(&json!("fortnight")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEnumValue { enum_name: "CalendarInterval", .. }
        ));
    }

    #[test]
    fn test_json_data_serde_bridge() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Owner {
            team: String,
        }
        let data = JsonData::from_serde(&Owner { team: "search".into() }).unwrap();
        assert_eq!(data.as_value(), &json!({"team": "search"}));
        assert_eq!(data.to::<Owner>().unwrap(), Owner { team: "search".into() });
    }
}
