//! Field codec tables.
//!
//! An [`ObjectCodec`] is the ordered list of JSON field bindings for one
//! value type. The decoder visits the object's members and dispatches each
//! key to its binding's reader, which stores the value into the builder.
//! The encoder walks the same bindings in declaration order, so the two
//! sides never drift apart.
//!
//! Shared base field sets are registered by `setup_*` functions that take a
//! codec generic over any type exposing the base accessors. A concrete type
//! calls its bases' setup functions first, then appends its own bindings.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::codec::primitives::{Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};

/// Reads one member value into a builder.
pub type ReadFn<B> = for<'a> fn(&mut B, &mut Reader<'a>) -> Result<(), DecodeError>;

/// Writes one member (key and value) of a value object, or nothing if absent.
pub type WriteFn<T> = fn(&T, &mut Writer) -> Result<(), EncodeError>;

/// Reads a member whose key has no binding.
pub type ReadUnknownFn<B> = for<'a> fn(&mut B, &'a str, &mut Reader<'a>) -> Result<(), DecodeError>;

/// One JSON key bound to a reader and a writer.
pub struct FieldBinding<T, B> {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub read: ReadFn<B>,
    pub write: WriteFn<T>,
}

/// Fallback for keys with no binding, and the writer for what it collected.
pub struct ExtensionSlot<T, B> {
    pub read_unknown: ReadUnknownFn<B>,
    pub write_extra: WriteFn<T>,
}

/// Ordered field bindings plus the build step for one value type.
pub struct ObjectCodec<T, B> {
    type_name: &'static str,
    fields: Vec<FieldBinding<T, B>>,
    index: FxHashMap<&'static str, usize>,
    extension: Option<ExtensionSlot<T, B>>,
    new_builder: fn() -> B,
    build: fn(&mut B) -> Result<T, BuildError>,
}

impl<T, B> ObjectCodec<T, B> {
    /// Creates an empty table.
    pub fn new(
        type_name: &'static str,
        new_builder: fn() -> B,
        build: fn(&mut B) -> Result<T, BuildError>,
    ) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
            index: FxHashMap::default(),
            extension: None,
            new_builder,
            build,
        }
    }

    /// Returns the name of the type this table describes.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Appends a binding.
    pub fn add(&mut self, name: &'static str, read: ReadFn<B>, write: WriteFn<T>) -> &mut Self {
        self.add_with_aliases(name, &[], read, write)
    }

    /// Appends a binding that also accepts `aliases` on decode.
    ///
    /// Re-registering a name replaces the earlier binding in place.
    pub fn add_with_aliases(
        &mut self,
        name: &'static str,
        aliases: &'static [&'static str],
        read: ReadFn<B>,
        write: WriteFn<T>,
    ) -> &mut Self {
        let binding = FieldBinding {
            name,
            aliases,
            read,
            write,
        };
        let position = match self.index.get(name) {
            Some(&existing) => {
                self.fields[existing] = binding;
                existing
            }
            None => {
                self.fields.push(binding);
                self.fields.len() - 1
            }
        };
        self.index.insert(name, position);
        for alias in aliases {
            self.index.insert(alias, position);
        }
        self
    }

    /// Installs the unknown-field handler.
    pub fn set_extension(&mut self, read_unknown: ReadUnknownFn<B>, write_extra: WriteFn<T>) -> &mut Self {
        self.extension = Some(ExtensionSlot {
            read_unknown,
            write_extra,
        });
        self
    }

    /// Returns the primary names of all bindings in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Returns true if `key` (a primary name or an alias) has a binding.
    pub fn has_field(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Decodes an object into a fresh builder and builds it.
    pub fn decode(&self, reader: &mut Reader<'_>) -> Result<T, DecodeError> {
        let mut builder = (self.new_builder)();
        self.decode_into(&mut builder, reader)?;
        (self.build)(&mut builder).map_err(|source| reader.build_error(source))
    }

    /// Decodes an object's members into an existing builder.
    pub fn decode_into<'a>(&self, builder: &mut B, reader: &mut Reader<'a>) -> Result<(), DecodeError> {
        reader.read_object(|key, reader| self.read_member(builder, key, reader))
    }

    fn read_member<'a>(&self, builder: &mut B, key: &'a str, reader: &mut Reader<'a>) -> Result<(), DecodeError> {
        if let Some(&position) = self.index.get(key) {
            return (self.fields[position].read)(builder, reader);
        }
        if let Some(extension) = &self.extension {
            return (extension.read_unknown)(builder, key, reader);
        }
        if reader.options().ignore_unknown_fields {
            trace!(type_name = self.type_name, field = key, path = %reader.path(), "skipping unknown field");
            return Ok(());
        }
        Err(DecodeError::UnknownField {
            type_name: self.type_name,
            field: key.to_string(),
            path: reader.path(),
        })
    }

    /// Encodes a value as an object: bindings in order, then extension members.
    pub fn encode(&self, value: &T, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.begin_object()?;
        self.encode_members(value, writer)?;
        writer.end_object()
    }

    /// Writes a value's members into an already open object.
    pub fn encode_members(&self, value: &T, writer: &mut Writer) -> Result<(), EncodeError> {
        for field in &self.fields {
            (field.write)(value, writer)?;
        }
        if let Some(extension) = &self.extension {
            (extension.write_extra)(value, writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::codec::DecodeOptions;
    use crate::error::ErrorKind;
    use crate::model::builder::{SingleUse, require};

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        label: Option<String>,
        extra: BTreeMap<String, i64>,
    }

    #[derive(Default)]
    struct PointBuilder {
        guard: SingleUse,
        x: Option<i64>,
        label: Option<String>,
        extra: BTreeMap<String, i64>,
    }

    impl PointBuilder {
        fn build(&mut self) -> Result<Point, BuildError> {
            self.guard.consume("Point")?;
            Ok(Point {
                x: require(self.x.take(), "Point", "x")?,
                label: self.label.take(),
                extra: std::mem::take(&mut self.extra),
            })
        }
    }

    fn point_codec(with_extension: bool) -> ObjectCodec<Point, PointBuilder> {
        let mut codec = ObjectCodec::new("Point", PointBuilder::default, PointBuilder::build);
        codec.add_with_aliases(
            "x",
            &["x_pos"],
            |b, r| {
                b.x = Some(r.read_i64()?);
                Ok(())
            },
            |v, w| w.write_field("x", &v.x),
        );
        codec.add(
            "label",
            |b, r| {
                b.label = Some(r.read_string()?);
                Ok(())
            },
            |v, w| w.write_optional_field("label", v.label.as_ref()),
        );
        if with_extension {
            codec.set_extension(
                |b, key, r| {
                    b.extra.insert(key.to_string(), r.read_i64()?);
                    Ok(())
                },
                |v, w| {
                    for (key, value) in &v.extra {
                        w.write_field(key, value)?;
                    }
                    Ok(())
                },
            );
        }
        codec
    }

    fn encode_to_string(codec: &ObjectCodec<Point, PointBuilder>, point: &Point) -> String {
        let mut writer = Writer::new();
        codec.encode(point, &mut writer).unwrap();
        writer.into_string().unwrap()
    }

    #[test]
    fn test_decode_with_alias_and_optional() {
        let codec = point_codec(false);
        let value = json!({"x_pos": 3});
        let point = codec.decode(&mut Reader::new(&value)).unwrap();
        assert_eq!(point.x, 3);
        assert_eq!(point.label, None);
        assert_eq!(encode_to_string(&codec, &point), r#"{"x":3}"#);
    }

    #[test]
    fn test_missing_required_field() {
        let codec = point_codec(false);
        let value = json!({"label": "a"});
        let err = codec.decode(&mut Reader::new(&value)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_unknown_field_rejected_or_skipped() {
        let codec = point_codec(false);
        let value = json!({"x": 1, "y": 2});
        let err = codec.decode(&mut Reader::new(&value)).unwrap_err();
        assert!(matches!(
            &err,
            DecodeError::UnknownField { type_name: "Point", field, path } if field == "y" && path == "$.y"
        ));

        let options = DecodeOptions::default().with_ignore_unknown_fields(true);
        let point = codec.decode(&mut Reader::with_options(&value, options)).unwrap();
        assert_eq!(point.x, 1);
    }

    #[test]
    fn test_extension_slot_collects_unknown_keys() {
        let codec = point_codec(true);
        let value = json!({"x": 1, "label": "p", "y": 2, "z": 3});
        let point = codec.decode(&mut Reader::new(&value)).unwrap();
        assert_eq!(point.extra.len(), 2);
        assert_eq!(encode_to_string(&codec, &point), r#"{"x":1,"label":"p","y":2,"z":3}"#);
    }

    #[test]
    fn test_rebinding_replaces_in_place() {
        let mut codec = point_codec(false);
        codec.add(
            "x",
            |b, r| {
                b.x = Some(r.read_i64()? * 10);
                Ok(())
            },
            |v, w| w.write_field("x", &v.x),
        );
        assert_eq!(codec.field_names().collect::<Vec<_>>(), vec!["x", "label"]);
        let value = json!({"x": 2});
        assert_eq!(codec.decode(&mut Reader::new(&value)).unwrap().x, 20);
    }
}
