//! JSON primitives: a positioned reader over one buffered JSON value and a
//! positioned writer that assembles one.
//!
//! The reader works on an already parsed [`serde_json::Value`], so a value
//! can be replayed any number of times. Union decoding relies on this: each
//! candidate decoder sees the same value from the same position.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

use crate::codec::options::{DecodeOptions, EncodeOptions};
use crate::codec::{Decode, Encode, JsonEnum};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::limits::MAX_SAFE_INTEGER;

/// Syntactic kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Returns the kind of a parsed value.
    pub fn of(value: &Value) -> JsonKind {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }

    /// Returns the lowercase JSON name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

// =============================================================================
// DECODING
// =============================================================================

/// Positioned reader over a buffered JSON value.
///
/// Nested values are visited through [`read_object`](Reader::read_object)
/// and [`read_array`](Reader::read_array), which move the position down one
/// level for the duration of a callback and track the path for error
/// messages.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    current: &'a Value,
    path: Vec<PathSegment<'a>>,
    options: DecodeOptions,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at `value` with default options.
    pub fn new(value: &'a Value) -> Self {
        Self::with_options(value, DecodeOptions::default())
    }

    /// Creates a reader positioned at `value`.
    pub fn with_options(value: &'a Value, options: DecodeOptions) -> Self {
        Self {
            current: value,
            path: Vec::new(),
            options,
        }
    }

    /// Returns the decode options in effect.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Returns the value at the current position.
    pub fn value(&self) -> &'a Value {
        self.current
    }

    /// Returns the kind of the value at the current position.
    pub fn kind(&self) -> JsonKind {
        JsonKind::of(self.current)
    }

    /// Returns true if the current value is JSON `null`.
    pub fn is_null(&self) -> bool {
        self.current.is_null()
    }

    /// Returns the nesting depth of the current position (root is 0).
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Renders the path of the current position, e.g. `$.aggs.by_tag.buckets[2]`.
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    /// Builds an `UnexpectedType` error for the current value.
    pub fn unexpected(&self, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedType {
            path: self.path(),
            expected,
            found: self.kind(),
        }
    }

    /// Wraps a builder failure with the current path.
    pub fn build_error(&self, source: BuildError) -> DecodeError {
        DecodeError::Build {
            path: self.path(),
            source,
        }
    }

    fn invalid_number(&self, expected: &'static str, value: impl Into<String>) -> DecodeError {
        DecodeError::InvalidNumber {
            path: self.path(),
            expected,
            value: value.into(),
        }
    }

    /// Moves to `value` for the duration of `f`.
    fn descend<T>(
        &mut self,
        segment: PathSegment<'a>,
        value: &'a Value,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if self.path.len() >= self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                path: self.path(),
                max: self.options.max_depth,
            });
        }
        let parent = std::mem::replace(&mut self.current, value);
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        self.current = parent;
        result
    }

    // -------------------------------------------------------------------------
    // Scalars
    // -------------------------------------------------------------------------

    /// Reads a boolean. The strings `"true"` and `"false"` are accepted.
    pub fn read_bool(&self) -> Result<bool, DecodeError> {
        match self.current {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            _ => Err(self.unexpected("boolean")),
        }
    }

    /// Reads a signed 64-bit integer.
    ///
    /// Integral floats (`5.0`) and numeric strings (`"5"`) are accepted.
    pub fn read_i64(&self) -> Result<i64, DecodeError> {
        match self.current {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 9.223_372_036_854_775e18 => {
                        Ok(f as i64)
                    }
                    _ => Err(self.invalid_number("a 64-bit integer", n.to_string())),
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.invalid_number("a 64-bit integer", s.as_str())),
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Reads a signed 32-bit integer.
    pub fn read_i32(&self) -> Result<i32, DecodeError> {
        let value = self.read_i64()?;
        i32::try_from(value).map_err(|_| self.invalid_number("a 32-bit integer", value.to_string()))
    }

    /// Reads a double. Numeric strings are accepted; `"NaN"` and
    /// `"Infinity"` are not.
    pub fn read_f64(&self) -> Result<f64, DecodeError> {
        match self.current {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| self.invalid_number("a double", n.to_string())),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(self.invalid_number("a finite double", s.as_str())),
            },
            _ => Err(self.unexpected("number")),
        }
    }

    /// Reads a double, substituting `default` for JSON `null`.
    ///
    /// Metric results report "no value" as `null`; the typed field stores
    /// the surrogate instead.
    pub fn read_f64_or_null(&self, default: f64) -> Result<f64, DecodeError> {
        if self.is_null() {
            return Ok(default);
        }
        self.read_f64()
    }

    /// Reads a string without copying it.
    pub fn read_str(&self) -> Result<&'a str, DecodeError> {
        match self.current {
            Value::String(s) => Ok(s.as_str()),
            _ => Err(self.unexpected("string")),
        }
    }

    /// Reads a string. Numbers and booleans are accepted in their JSON form.
    pub fn read_string(&self) -> Result<String, DecodeError> {
        match self.current {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(self.unexpected("string")),
        }
    }

    /// Reads a JSON enum member by its wire name or one of its aliases.
    pub fn read_enum<E: JsonEnum>(&self) -> Result<E, DecodeError> {
        let value = self.read_str()?;
        E::from_json_value(value).ok_or_else(|| DecodeError::InvalidEnumValue {
            path: self.path(),
            enum_name: E::NAME,
            value: value.to_string(),
        })
    }

    /// Copies the current value out as arbitrary JSON.
    pub fn read_json(&self) -> Value {
        self.current.clone()
    }

    // -------------------------------------------------------------------------
    // Containers
    // -------------------------------------------------------------------------

    /// Visits each member of the current object in document order.
    pub fn read_object<F>(&mut self, mut f: F) -> Result<(), DecodeError>
    where
        F: FnMut(&'a str, &mut Reader<'a>) -> Result<(), DecodeError>,
    {
        let current = self.current;
        let map = match current {
            Value::Object(map) => map,
            _ => return Err(self.unexpected("object")),
        };
        for (key, value) in map {
            let key = key.as_str();
            self.descend(PathSegment::Key(key), value, |reader| f(key, reader))?;
        }
        Ok(())
    }

    /// Visits each element of the current array in order.
    pub fn read_array<F>(&mut self, mut f: F) -> Result<(), DecodeError>
    where
        F: FnMut(&mut Reader<'a>) -> Result<(), DecodeError>,
    {
        let current = self.current;
        let items = match current {
            Value::Array(items) => items,
            _ => return Err(self.unexpected("array")),
        };
        for (index, item) in items.iter().enumerate() {
            self.descend(PathSegment::Index(index), item, &mut f)?;
        }
        Ok(())
    }

    /// Reads an array, decoding each element with `f`.
    pub fn read_vec<T, F>(&mut self, mut f: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut Reader<'a>) -> Result<T, DecodeError>,
    {
        let mut out = match self.current {
            Value::Array(items) => Vec::with_capacity(items.len()),
            _ => Vec::new(),
        };
        self.read_array(|reader| {
            out.push(f(reader)?);
            Ok(())
        })?;
        Ok(out)
    }

    /// Reads an object as a string-keyed map, decoding each value with `f`.
    pub fn read_string_map<T, F>(&mut self, mut f: F) -> Result<BTreeMap<String, T>, DecodeError>
    where
        F: FnMut(&mut Reader<'a>) -> Result<T, DecodeError>,
    {
        let mut out = BTreeMap::new();
        self.read_object(|key, reader| {
            out.insert(key.to_string(), f(reader)?);
            Ok(())
        })?;
        Ok(out)
    }

    /// Reads either an array of values or a single value as a one-element list.
    pub fn read_single_or_vec<T, F>(&mut self, mut f: F) -> Result<Vec<T>, DecodeError>
    where
        F: FnMut(&mut Reader<'a>) -> Result<T, DecodeError>,
    {
        if self.kind() == JsonKind::Array {
            self.read_vec(f)
        } else {
            Ok(vec![f(self)?])
        }
    }

    /// Reads a value that may be JSON `null`.
    pub fn read_nullable<T, F>(&mut self, f: F) -> Result<Option<T>, DecodeError>
    where
        F: FnOnce(&mut Reader<'a>) -> Result<T, DecodeError>,
    {
        if self.is_null() {
            Ok(None)
        } else {
            f(self).map(Some)
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

#[derive(Debug)]
enum Frame {
    Object {
        map: Map<String, Value>,
        key: Option<String>,
    },
    Array(Vec<Value>),
}

/// Positioned writer that assembles a JSON value.
///
/// Object members keep the order they were written in.
#[derive(Debug, Default)]
pub struct Writer {
    stack: Vec<Frame>,
    root: Option<Value>,
    options: EncodeOptions,
}

impl Writer {
    /// Creates a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given options.
    pub fn with_options(options: EncodeOptions) -> Self {
        Self {
            stack: Vec::new(),
            root: None,
            options,
        }
    }

    /// Returns the encode options in effect.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Returns the current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Opens an object.
    pub fn begin_object(&mut self) -> Result<(), EncodeError> {
        self.check_value_slot()?;
        self.stack.push(Frame::Object {
            map: Map::new(),
            key: None,
        });
        Ok(())
    }

    /// Closes the innermost object.
    pub fn end_object(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Object { map, key: None }) => self.push_value(Value::Object(map)),
            Some(Frame::Object { key: Some(_), .. }) => Err(EncodeError::InvalidWriterState {
                context: "object closed after a key with no value",
            }),
            _ => Err(EncodeError::InvalidWriterState {
                context: "end_object without a matching begin_object",
            }),
        }
    }

    /// Opens an array.
    pub fn begin_array(&mut self) -> Result<(), EncodeError> {
        self.check_value_slot()?;
        self.stack.push(Frame::Array(Vec::new()));
        Ok(())
    }

    /// Closes the innermost array.
    pub fn end_array(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Array(items)) => self.push_value(Value::Array(items)),
            _ => Err(EncodeError::InvalidWriterState {
                context: "end_array without a matching begin_array",
            }),
        }
    }

    /// Writes an object key. The next value written becomes its member.
    pub fn key(&mut self, key: impl Into<String>) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(Frame::Object { key: slot @ None, .. }) => {
                *slot = Some(key.into());
                Ok(())
            }
            Some(Frame::Object { .. }) => Err(EncodeError::InvalidWriterState {
                context: "two keys written without a value",
            }),
            _ => Err(EncodeError::InvalidWriterState {
                context: "key written outside of an object",
            }),
        }
    }

    /// Writes JSON `null`.
    pub fn write_null(&mut self) -> Result<(), EncodeError> {
        self.push_value(Value::Null)
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, value: bool) -> Result<(), EncodeError> {
        self.push_value(Value::Bool(value))
    }

    /// Writes a signed integer.
    pub fn write_i64(&mut self, value: i64) -> Result<(), EncodeError> {
        self.push_value(Value::Number(Number::from(value)))
    }

    /// Writes a double. Integral values are written as JSON integers (`0`, not `0.0`).
    pub fn write_f64(&mut self, value: f64) -> Result<(), EncodeError> {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
            return self.write_i64(value as i64);
        }
        self.write_f64_exact(value)
    }

    /// Writes a double keeping its floating representation (`5.0` stays `5.0`).
    pub fn write_f64_exact(&mut self, value: f64) -> Result<(), EncodeError> {
        match Number::from_f64(value) {
            Some(number) => self.push_value(Value::Number(number)),
            None => Err(EncodeError::NonFiniteNumber {
                field: self.current_field(),
            }),
        }
    }

    /// Writes a string.
    pub fn write_str(&mut self, value: &str) -> Result<(), EncodeError> {
        self.push_value(Value::String(value.to_string()))
    }

    /// Writes a JSON enum member by its wire name.
    pub fn write_enum<E: JsonEnum>(&mut self, value: E) -> Result<(), EncodeError> {
        self.write_str(value.json_value())
    }

    /// Writes arbitrary JSON.
    pub fn write_json(&mut self, value: &Value) -> Result<(), EncodeError> {
        self.push_value(value.clone())
    }

    /// Writes `key` followed by `value`.
    pub fn write_field<T: Encode + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), EncodeError> {
        self.key(key)?;
        value.encode(self)
    }

    /// Writes `key` followed by `value` when `value` is present; writes nothing otherwise.
    pub fn write_optional_field<T: Encode + ?Sized>(
        &mut self,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.write_field(key, value),
            None => Ok(()),
        }
    }

    /// Writes `key` and a map, unless the map is empty.
    pub fn write_map_field<T: Encode>(&mut self, key: &str, map: &BTreeMap<String, T>) -> Result<(), EncodeError> {
        if map.is_empty() {
            return Ok(());
        }
        self.key(key)?;
        self.write_string_map(map)
    }

    /// Writes `key` and a list, unless the list is empty.
    pub fn write_slice_field<T: Encode>(&mut self, key: &str, items: &[T]) -> Result<(), EncodeError> {
        if items.is_empty() {
            return Ok(());
        }
        self.key(key)?;
        self.write_slice(items)
    }

    /// Writes a list as a JSON array.
    pub fn write_slice<T: Encode>(&mut self, items: &[T]) -> Result<(), EncodeError> {
        self.begin_array()?;
        for item in items {
            item.encode(self)?;
        }
        self.end_array()
    }

    /// Writes a string-keyed map as a JSON object.
    pub fn write_string_map<T: Encode>(&mut self, map: &BTreeMap<String, T>) -> Result<(), EncodeError> {
        self.begin_object()?;
        for (key, value) in map {
            self.key(key.as_str())?;
            value.encode(self)?;
        }
        self.end_object()
    }

    /// Finishes writing and returns the assembled value.
    pub fn into_value(self) -> Result<Value, EncodeError> {
        if !self.stack.is_empty() {
            return Err(EncodeError::InvalidWriterState {
                context: "unclosed object or array",
            });
        }
        self.root.ok_or(EncodeError::InvalidWriterState {
            context: "nothing was written",
        })
    }

    /// Finishes writing and renders the value as JSON text.
    pub fn into_string(self) -> Result<String, EncodeError> {
        let pretty = self.options.pretty;
        let value = self.into_value()?;
        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    fn check_value_slot(&self) -> Result<(), EncodeError> {
        match self.stack.last() {
            Some(Frame::Object { key: None, .. }) => Err(EncodeError::InvalidWriterState {
                context: "object member written without a key",
            }),
            None if self.root.is_some() => Err(EncodeError::InvalidWriterState {
                context: "more than one root value",
            }),
            _ => Ok(()),
        }
    }

    fn push_value(&mut self, value: Value) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(Frame::Object { map, key }) => match key.take() {
                Some(key) => {
                    map.insert(key, value);
                    Ok(())
                }
                None => Err(EncodeError::InvalidWriterState {
                    context: "object member written without a key",
                }),
            },
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            }
            None if self.root.is_some() => Err(EncodeError::InvalidWriterState {
                context: "more than one root value",
            }),
            None => {
                self.root = Some(value);
                Ok(())
            }
        }
    }

    fn current_field(&self) -> String {
        match self.stack.last() {
            Some(Frame::Object { key: Some(key), .. }) => key.clone(),
            Some(Frame::Array(items)) => format!("[{}]", items.len()),
            _ => "$".to_string(),
        }
    }
}

// =============================================================================
// SCALAR CODECS
// =============================================================================

impl Encode for str {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_str(self)
    }
}

impl Encode for String {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_str(self)
    }
}

impl Decode for String {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_string()
    }
}

impl Encode for f64 {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_f64(*self)
    }
}

impl Decode for f64 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_f64()
    }
}

impl Encode for i64 {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_i64(*self)
    }
}

impl Decode for i64 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_i64()
    }
}

impl Encode for i32 {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_i64(i64::from(*self))
    }
}

impl Decode for i32 {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_i32()
    }
}

impl Encode for bool {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_bool(*self)
    }
}

impl Decode for bool {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        reader.read_bool()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_read_numbers_lenient() {
        let value = json!({"a": 5, "b": 5.0, "c": "7", "d": "2.5", "e": null});
        let mut reader = Reader::new(&value);
        let mut seen = Vec::new();
        reader
            .read_object(|key, r| {
                match key {
                    "a" | "b" | "c" => seen.push(r.read_i64()? as f64),
                    "d" => seen.push(r.read_f64()?),
                    "e" => seen.push(r.read_f64_or_null(0.0)?),
                    _ => unreachable!(),
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, vec![5.0, 5.0, 7.0, 2.5, 0.0]);
    }

    #[test]
    fn test_read_f64_rejects_non_finite_strings() {
        for text in ["NaN", "inf", "-Infinity", "infinity"] {
            let value = json!(text);
            let reader = Reader::new(&value);
            assert!(
                matches!(reader.read_f64(), Err(DecodeError::InvalidNumber { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_read_i64_rejects_fraction() {
        let value = json!(1.5);
        let reader = Reader::new(&value);
        assert!(matches!(reader.read_i64(), Err(DecodeError::InvalidNumber { .. })));
    }

    #[test]
    fn test_error_path() {
        let value = json!({"outer": {"list": [1, "x"]}});
        let mut reader = Reader::new(&value);
        let err = reader
            .read_object(|_, r| {
                r.read_object(|_, r| {
                    r.read_vec(|r| r.read_bool())?;
                    Ok(())
                })
            })
            .unwrap_err();
        assert_eq!(err.path(), Some("$.outer.list[0]"));
        assert!(matches!(
            err,
            DecodeError::UnexpectedType { found: JsonKind::Number, .. }
        ));
    }

    #[test]
    fn test_depth_limit() {
        let value = json!([[[[1]]]]);
        let mut reader = Reader::with_options(&value, DecodeOptions::default().with_max_depth(2));
        fn walk(r: &mut Reader<'_>) -> Result<(), DecodeError> {
            if r.kind() == JsonKind::Array {
                r.read_array(walk)
            } else {
                Ok(())
            }
        }
        assert!(matches!(
            walk(&mut reader),
            Err(DecodeError::DepthLimitExceeded { max: 2, .. })
        ));
    }

    #[test]
    fn test_single_or_vec() {
        let single = json!("a");
        let many = json!(["a", "b"]);
        let one = Reader::new(&single).read_single_or_vec(|r| r.read_string()).unwrap();
        let two = Reader::new(&many).read_single_or_vec(|r| r.read_string()).unwrap();
        assert_eq!(one, vec!["a"]);
        assert_eq!(two, vec!["a", "b"]);
    }

    #[test]
    fn test_writer_preserves_member_order() {
        let mut writer = Writer::new();
        writer.begin_object().unwrap();
        writer.write_field("zeta", &1i64).unwrap();
        writer.write_field("alpha", "x").unwrap();
        writer.key("list").unwrap();
        writer.write_slice(&[1.5f64, 2.0]).unwrap();
        writer.end_object().unwrap();
        assert_eq!(
            writer.into_string().unwrap(),
            r#"{"zeta":1,"alpha":"x","list":[1.5,2]}"#
        );
    }

    #[test]
    fn test_write_f64_integral_as_integer() {
        let mut writer = Writer::new();
        writer.write_f64(0.0).unwrap();
        assert_eq!(writer.into_string().unwrap(), "0");

        let mut writer = Writer::new();
        writer.write_f64_exact(5.0).unwrap();
        assert_eq!(writer.into_string().unwrap(), "5.0");
    }

    #[test]
    fn test_write_non_finite_rejected() {
        let mut writer = Writer::new();
        writer.begin_object().unwrap();
        let result = writer.write_field("value", &f64::NAN);
        assert_eq!(
            result,
            Err(EncodeError::NonFiniteNumber {
                field: "value".to_string()
            })
        );
    }

    #[test]
    fn test_writer_state_errors() {
        let mut writer = Writer::new();
        writer.begin_object().unwrap();
        assert!(writer.write_bool(true).is_err());
        assert!(writer.end_array().is_err());

        let mut writer = Writer::new();
        writer.write_null().unwrap();
        assert!(writer.write_null().is_err());

        let mut writer = Writer::new();
        writer.begin_array().unwrap();
        assert!(writer.into_value().is_err());
    }
}
