//! Bucket items of multi-bucket aggregates.
//!
//! Every bucket carries a `doc_count` and the results of its
//! sub-aggregations, which arrive as typed-key members beside the bucket's
//! own fields.

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, ObjectCodec, Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::model::aggregate::base::{BucketBase, BucketBaseBuilder, BucketFields, BucketSetters, setup_bucket};
use crate::model::builder::{SingleUse, require};

/// Implements the bucket base traits and the codec glue for a bucket type.
macro_rules! bucket_common {
    ($name:ident, $builder:ident, $codec:ident) => {
        impl $name {
            pub fn builder() -> $builder {
                $builder::new()
            }
        }

        impl BucketFields for $name {
            fn bucket_base(&self) -> &BucketBase {
                &self.bucket
            }
        }

        impl BucketSetters for $builder {
            fn bucket_base_mut(&mut self) -> &mut BucketBaseBuilder {
                &mut self.bucket
            }
        }

        impl Encode for $name {
            fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
                $codec.encode(self, writer)
            }
        }

        impl Decode for $name {
            fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
                $codec.decode(reader)
            }
        }
    };
}

// =============================================================================
// TERMS BUCKETS
// =============================================================================

/// Bucket of a `sterms` aggregate (terms over a keyword field).
#[derive(Debug, Clone, PartialEq)]
pub struct StringTermsBucket {
    bucket: BucketBase,
    key: String,
    doc_count_error: Option<i64>,
}

impl StringTermsBucket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn doc_count_error(&self) -> Option<i64> {
        self.doc_count_error
    }
}

/// Builder for [`StringTermsBucket`].
#[derive(Debug, Clone, Default)]
pub struct StringTermsBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<String>,
    doc_count_error: Option<i64>,
}

impl StringTermsBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    pub fn doc_count_error(&mut self, value: i64) -> &mut Self {
        self.doc_count_error = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<StringTermsBucket, BuildError> {
        self.guard.consume("StringTermsBucket")?;
        Ok(StringTermsBucket {
            bucket: self.bucket.build_base("StringTermsBucket")?,
            key: require(self.key.take(), "StringTermsBucket", "key")?,
            doc_count_error: self.doc_count_error.take(),
        })
    }
}

lazy_static! {
    static ref STRING_TERMS_BUCKET_CODEC: ObjectCodec<StringTermsBucket, StringTermsBucketBuilder> = {
        let mut codec = ObjectCodec::new(
            "StringTermsBucket",
            StringTermsBucketBuilder::new,
            StringTermsBucketBuilder::build,
        );
        setup_bucket(&mut codec);
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
                "doc_count_error",
                |b, r| {
                    b.doc_count_error(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("doc_count_error", v.doc_count_error.as_ref()),
            );
        codec
    };
}

bucket_common!(StringTermsBucket, StringTermsBucketBuilder, STRING_TERMS_BUCKET_CODEC);

/// Bucket of an `lterms` aggregate (terms over an integer field).
#[derive(Debug, Clone, PartialEq)]
pub struct LongTermsBucket {
    bucket: BucketBase,
    key: i64,
    key_as_string: Option<String>,
    doc_count_error: Option<i64>,
}

impl LongTermsBucket {
    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn key_as_string(&self) -> Option<&str> {
        self.key_as_string.as_deref()
    }

    pub fn doc_count_error(&self) -> Option<i64> {
        self.doc_count_error
    }
}

/// Builder for [`LongTermsBucket`].
#[derive(Debug, Clone, Default)]
pub struct LongTermsBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<i64>,
    key_as_string: Option<String>,
    doc_count_error: Option<i64>,
}

impl LongTermsBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: i64) -> &mut Self {
        self.key = Some(key);
        self
    }

    pub fn key_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.key_as_string = Some(value.into());
        self
    }

    pub fn doc_count_error(&mut self, value: i64) -> &mut Self {
        self.doc_count_error = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<LongTermsBucket, BuildError> {
        self.guard.consume("LongTermsBucket")?;
        Ok(LongTermsBucket {
            bucket: self.bucket.build_base("LongTermsBucket")?,
            key: require(self.key.take(), "LongTermsBucket", "key")?,
            key_as_string: self.key_as_string.take(),
            doc_count_error: self.doc_count_error.take(),
        })
    }
}

lazy_static! {
    static ref LONG_TERMS_BUCKET_CODEC: ObjectCodec<LongTermsBucket, LongTermsBucketBuilder> = {
        let mut codec = ObjectCodec::new("LongTermsBucket", LongTermsBucketBuilder::new, LongTermsBucketBuilder::build);
        setup_bucket(&mut codec);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_field("key", &v.key),
            )
            .add(
                "key_as_string",
                |b, r| {
                    b.key_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key_as_string", v.key_as_string.as_ref()),
            )
            .add(
                "doc_count_error",
                |b, r| {
                    b.doc_count_error(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("doc_count_error", v.doc_count_error.as_ref()),
            );
        codec
    };
}

bucket_common!(LongTermsBucket, LongTermsBucketBuilder, LONG_TERMS_BUCKET_CODEC);

/// Bucket of a `dterms` aggregate (terms over a floating point field).
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleTermsBucket {
    bucket: BucketBase,
    key: f64,
    key_as_string: Option<String>,
    doc_count_error: Option<i64>,
}

impl DoubleTermsBucket {
    pub fn key(&self) -> f64 {
        self.key
    }

    pub fn key_as_string(&self) -> Option<&str> {
        self.key_as_string.as_deref()
    }

    pub fn doc_count_error(&self) -> Option<i64> {
        self.doc_count_error
    }
}

/// Builder for [`DoubleTermsBucket`].
#[derive(Debug, Clone, Default)]
pub struct DoubleTermsBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<f64>,
    key_as_string: Option<String>,
    doc_count_error: Option<i64>,
}

impl DoubleTermsBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: f64) -> &mut Self {
        self.key = Some(key);
        self
    }

    pub fn key_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.key_as_string = Some(value.into());
        self
    }

    pub fn doc_count_error(&mut self, value: i64) -> &mut Self {
        self.doc_count_error = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<DoubleTermsBucket, BuildError> {
        self.guard.consume("DoubleTermsBucket")?;
        Ok(DoubleTermsBucket {
            bucket: self.bucket.build_base("DoubleTermsBucket")?,
            key: require(self.key.take(), "DoubleTermsBucket", "key")?,
            key_as_string: self.key_as_string.take(),
            doc_count_error: self.doc_count_error.take(),
        })
    }
}

lazy_static! {
    static ref DOUBLE_TERMS_BUCKET_CODEC: ObjectCodec<DoubleTermsBucket, DoubleTermsBucketBuilder> = {
        let mut codec = ObjectCodec::new(
            "DoubleTermsBucket",
            DoubleTermsBucketBuilder::new,
            DoubleTermsBucketBuilder::build,
        );
        setup_bucket(&mut codec);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_field("key", &v.key),
            )
            .add(
                "key_as_string",
                |b, r| {
                    b.key_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key_as_string", v.key_as_string.as_ref()),
            )
            .add(
                "doc_count_error",
                |b, r| {
                    b.doc_count_error(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("doc_count_error", v.doc_count_error.as_ref()),
            );
        codec
    };
}

bucket_common!(DoubleTermsBucket, DoubleTermsBucketBuilder, DOUBLE_TERMS_BUCKET_CODEC);

// =============================================================================
// HISTOGRAM BUCKETS
// =============================================================================

/// Bucket of a `histogram` aggregate; `key` is the bucket's lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucket {
    bucket: BucketBase,
    key: f64,
    key_as_string: Option<String>,
}

impl HistogramBucket {
    pub fn key(&self) -> f64 {
        self.key
    }

    pub fn key_as_string(&self) -> Option<&str> {
        self.key_as_string.as_deref()
    }
}

/// Builder for [`HistogramBucket`].
#[derive(Debug, Clone, Default)]
pub struct HistogramBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<f64>,
    key_as_string: Option<String>,
}

impl HistogramBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: f64) -> &mut Self {
        self.key = Some(key);
        self
    }

    pub fn key_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.key_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<HistogramBucket, BuildError> {
        self.guard.consume("HistogramBucket")?;
        Ok(HistogramBucket {
            bucket: self.bucket.build_base("HistogramBucket")?,
            key: require(self.key.take(), "HistogramBucket", "key")?,
            key_as_string: self.key_as_string.take(),
        })
    }
}

lazy_static! {
    static ref HISTOGRAM_BUCKET_CODEC: ObjectCodec<HistogramBucket, HistogramBucketBuilder> = {
        let mut codec = ObjectCodec::new("HistogramBucket", HistogramBucketBuilder::new, HistogramBucketBuilder::build);
        setup_bucket(&mut codec);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_field("key", &v.key),
            )
            .add(
                "key_as_string",
                |b, r| {
                    b.key_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key_as_string", v.key_as_string.as_ref()),
            );
        codec
    };
}

bucket_common!(HistogramBucket, HistogramBucketBuilder, HISTOGRAM_BUCKET_CODEC);

/// Bucket of a `date_histogram` aggregate; `key` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DateHistogramBucket {
    bucket: BucketBase,
    key: i64,
    key_as_string: Option<String>,
}

impl DateHistogramBucket {
    pub fn key(&self) -> i64 {
        self.key
    }

    pub fn key_as_string(&self) -> Option<&str> {
        self.key_as_string.as_deref()
    }
}

/// Builder for [`DateHistogramBucket`].
#[derive(Debug, Clone, Default)]
pub struct DateHistogramBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<i64>,
    key_as_string: Option<String>,
}

impl DateHistogramBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: i64) -> &mut Self {
        self.key = Some(key);
        self
    }

    pub fn key_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.key_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<DateHistogramBucket, BuildError> {
        self.guard.consume("DateHistogramBucket")?;
        Ok(DateHistogramBucket {
            bucket: self.bucket.build_base("DateHistogramBucket")?,
            key: require(self.key.take(), "DateHistogramBucket", "key")?,
            key_as_string: self.key_as_string.take(),
        })
    }
}

lazy_static! {
    static ref DATE_HISTOGRAM_BUCKET_CODEC: ObjectCodec<DateHistogramBucket, DateHistogramBucketBuilder> = {
        let mut codec = ObjectCodec::new(
            "DateHistogramBucket",
            DateHistogramBucketBuilder::new,
            DateHistogramBucketBuilder::build,
        );
        setup_bucket(&mut codec);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_field("key", &v.key),
            )
            .add(
                "key_as_string",
                |b, r| {
                    b.key_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key_as_string", v.key_as_string.as_ref()),
            );
        codec
    };
}

bucket_common!(DateHistogramBucket, DateHistogramBucketBuilder, DATE_HISTOGRAM_BUCKET_CODEC);

// =============================================================================
// RANGE AND FILTERS BUCKETS
// =============================================================================

/// Bucket of a `range` aggregate. Open ends have no `from` or `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBucket {
    bucket: BucketBase,
    key: Option<String>,
    from: Option<f64>,
    to: Option<f64>,
    from_as_string: Option<String>,
    to_as_string: Option<String>,
}

impl RangeBucket {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn from(&self) -> Option<f64> {
        self.from
    }

    pub fn to(&self) -> Option<f64> {
        self.to
    }

    pub fn from_as_string(&self) -> Option<&str> {
        self.from_as_string.as_deref()
    }

    pub fn to_as_string(&self) -> Option<&str> {
        self.to_as_string.as_deref()
    }
}

/// Builder for [`RangeBucket`].
#[derive(Debug, Clone, Default)]
pub struct RangeBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
    key: Option<String>,
    from: Option<f64>,
    to: Option<f64>,
    from_as_string: Option<String>,
    to_as_string: Option<String>,
}

impl RangeBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    pub fn from(&mut self, value: f64) -> &mut Self {
        self.from = Some(value);
        self
    }

    pub fn to(&mut self, value: f64) -> &mut Self {
        self.to = Some(value);
        self
    }

    pub fn from_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.from_as_string = Some(value.into());
        self
    }

    pub fn to_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.to_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<RangeBucket, BuildError> {
        self.guard.consume("RangeBucket")?;
        Ok(RangeBucket {
            bucket: self.bucket.build_base("RangeBucket")?,
            key: self.key.take(),
            from: self.from.take(),
            to: self.to.take(),
            from_as_string: self.from_as_string.take(),
            to_as_string: self.to_as_string.take(),
        })
    }
}

lazy_static! {
    static ref RANGE_BUCKET_CODEC: ObjectCodec<RangeBucket, RangeBucketBuilder> = {
        let mut codec = ObjectCodec::new("RangeBucket", RangeBucketBuilder::new, RangeBucketBuilder::build);
        setup_bucket(&mut codec);
        codec
            .add(
                "key",
                |b, r| {
                    b.key(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("key", v.key.as_ref()),
            )
            .add(
                "from",
                |b, r| {
                    b.from(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("from", v.from.as_ref()),
            )
            .add(
                "to",
                |b, r| {
                    b.to(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("to", v.to.as_ref()),
            )
            .add(
                "from_as_string",
                |b, r| {
                    b.from_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("from_as_string", v.from_as_string.as_ref()),
            )
            .add(
                "to_as_string",
                |b, r| {
                    b.to_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("to_as_string", v.to_as_string.as_ref()),
            );
        codec
    };
}

bucket_common!(RangeBucket, RangeBucketBuilder, RANGE_BUCKET_CODEC);

/// Bucket of a `filters` aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct FiltersBucket {
    bucket: BucketBase,
}

/// Builder for [`FiltersBucket`].
#[derive(Debug, Clone, Default)]
pub struct FiltersBucketBuilder {
    guard: SingleUse,
    bucket: BucketBaseBuilder,
}

impl FiltersBucketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self) -> Result<FiltersBucket, BuildError> {
        self.guard.consume("FiltersBucket")?;
        Ok(FiltersBucket {
            bucket: self.bucket.build_base("FiltersBucket")?,
        })
    }
}

lazy_static! {
    static ref FILTERS_BUCKET_CODEC: ObjectCodec<FiltersBucket, FiltersBucketBuilder> = {
        let mut codec = ObjectCodec::new("FiltersBucket", FiltersBucketBuilder::new, FiltersBucketBuilder::build);
        setup_bucket(&mut codec);
        codec
    };
}

bucket_common!(FiltersBucket, FiltersBucketBuilder, FILTERS_BUCKET_CODEC);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;

    #[test]
    fn test_sub_aggregations_routed_by_typed_key() {
        let input = json!({
            "key": "rust",
            "doc_count": 4,
            "avg#latency": {"value": 2.5},
            "max": {"value": 9}
        });
        let bucket: StringTermsBucket = decode_value(&input).unwrap();
        assert_eq!(bucket.key(), "rust");
        assert_eq!(bucket.doc_count(), 4);
        assert_eq!(bucket.aggregations().len(), 2);
        assert!(bucket.aggregation("latency").unwrap().is_avg());
        assert!(bucket.aggregation("max").unwrap().is_max());

        assert_eq!(
            encode_value(&bucket).unwrap(),
            json!({
                "doc_count": 4,
                "key": "rust",
                "avg#latency": {"value": 2.5},
                "max#max": {"value": 9}
            })
        );
    }

    #[test]
    fn test_unknown_kind_in_bucket() {
        let input = json!({"key": 1, "doc_count": 1, "bogus_kind": {}});
        let err = decode_value::<LongTermsBucket>(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
    }

    #[test]
    fn test_range_bucket_open_ends() {
        let input = json!({"key": "*-100.0", "to": 100.0, "doc_count": 7});
        let bucket: RangeBucket = decode_value(&input).unwrap();
        assert_eq!(bucket.from(), None);
        assert_eq!(bucket.to(), Some(100.0));
        assert_eq!(
            encode_value(&bucket).unwrap(),
            json!({"doc_count": 7, "key": "*-100.0", "to": 100})
        );
    }

    #[test]
    fn test_bucket_requires_doc_count() {
        let err = decode_value::<HistogramBucket>(&json!({"key": 10.0})).unwrap_err();
        assert!(err.to_string().contains("doc_count"));
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    }
}
