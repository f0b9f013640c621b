//! Field sets shared by aggregate result types.
//!
//! Every result embeds one or more base structs. For each base there is a
//! getter trait implemented by the result type, a setter trait implemented
//! by its builder (setters return the concrete builder so chains keep their
//! type), and a `setup_*` function that appends the base's bindings to a
//! codec table.

use std::collections::BTreeMap;

use crate::codec::typed_keys::{decode_typed_aggregate, write_aggregate_members};
use crate::codec::{Decode, Encode, ObjectCodec};
use crate::error::BuildError;
use crate::model::aggregate::Aggregate;
use crate::model::builder::require;
use crate::model::{Buckets, JsonData, Percentiles};

// =============================================================================
// AGGREGATE
// =============================================================================

/// Fields present on every aggregate result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateBase {
    pub(crate) meta: BTreeMap<String, JsonData>,
}

pub trait AggregateFields {
    fn aggregate_base(&self) -> &AggregateBase;

    /// Metadata echoed back from the request.
    fn meta(&self) -> &BTreeMap<String, JsonData> {
        &self.aggregate_base().meta
    }
}

pub trait AggregateSetters {
    fn aggregate_base_mut(&mut self) -> &mut AggregateBase;

    /// Replaces `meta`.
    fn meta(&mut self, meta: BTreeMap<String, JsonData>) -> &mut Self {
        self.aggregate_base_mut().meta = meta;
        self
    }

    /// Puts one `meta` entry.
    fn meta_entry(&mut self, key: impl Into<String>, value: impl Into<JsonData>) -> &mut Self {
        self.aggregate_base_mut().meta.insert(key.into(), value.into());
        self
    }

    /// Merges entries into `meta`.
    fn extend_meta(&mut self, entries: impl IntoIterator<Item = (String, JsonData)>) -> &mut Self {
        self.aggregate_base_mut().meta.extend(entries);
        self
    }
}

pub(crate) fn setup_aggregate<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: AggregateFields,
    B: AggregateSetters,
{
    codec.add(
        "meta",
        |b, r| {
            b.meta(r.read_string_map(JsonData::decode)?);
            Ok(())
        },
        |v, w| w.write_map_field("meta", v.meta()),
    );
}

// =============================================================================
// SINGLE METRIC
// =============================================================================

/// A single numeric result.
///
/// `value` reports "no value" (no documents, or all missing) as JSON `null`,
/// which decodes to `0.0`. `value_as_string` is only present when the
/// request set a `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMetricAggregateBase {
    pub(crate) value: f64,
    pub(crate) value_as_string: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SingleMetricAggregateBaseBuilder {
    value: Option<f64>,
    value_as_string: Option<String>,
}

impl SingleMetricAggregateBaseBuilder {
    pub(crate) fn build_base(&mut self, type_name: &'static str) -> Result<SingleMetricAggregateBase, BuildError> {
        Ok(SingleMetricAggregateBase {
            value: require(self.value.take(), type_name, "value")?,
            value_as_string: self.value_as_string.take(),
        })
    }
}

pub trait SingleMetricFields {
    fn single_metric_base(&self) -> &SingleMetricAggregateBase;

    fn value(&self) -> f64 {
        self.single_metric_base().value
    }

    fn value_as_string(&self) -> Option<&str> {
        self.single_metric_base().value_as_string.as_deref()
    }
}

pub trait SingleMetricSetters {
    fn single_metric_base_mut(&mut self) -> &mut SingleMetricAggregateBaseBuilder;

    fn value(&mut self, value: f64) -> &mut Self {
        self.single_metric_base_mut().value = Some(value);
        self
    }

    fn value_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.single_metric_base_mut().value_as_string = Some(value.into());
        self
    }
}

pub(crate) fn setup_single_metric_aggregate<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: AggregateFields + SingleMetricFields,
    B: AggregateSetters + SingleMetricSetters,
{
    setup_aggregate(codec);
    codec
        .add(
            "value",
            |b, r| {
                b.value(r.read_f64_or_null(0.0)?);
                Ok(())
            },
            |v, w| w.write_field("value", &v.value()),
        )
        .add(
            "value_as_string",
            |b, r| {
                b.value_as_string(r.read_string()?);
                Ok(())
            },
            |v, w| w.write_optional_field("value_as_string", v.value_as_string()),
        );
}

// =============================================================================
// BUCKET
// =============================================================================

/// Document count plus named sub-aggregation results.
///
/// Shared by bucket items and single-bucket aggregates (`filter`, `global`,
/// `missing`). Sub-results arrive as typed-key members next to `doc_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketBase {
    pub(crate) doc_count: i64,
    pub(crate) aggregations: BTreeMap<String, Aggregate>,
}

#[derive(Debug, Clone, Default)]
pub struct BucketBaseBuilder {
    doc_count: Option<i64>,
    aggregations: BTreeMap<String, Aggregate>,
}

impl BucketBaseBuilder {
    pub(crate) fn build_base(&mut self, type_name: &'static str) -> Result<BucketBase, BuildError> {
        Ok(BucketBase {
            doc_count: require(self.doc_count.take(), type_name, "doc_count")?,
            aggregations: std::mem::take(&mut self.aggregations),
        })
    }
}

pub trait BucketFields {
    fn bucket_base(&self) -> &BucketBase;

    fn doc_count(&self) -> i64 {
        self.bucket_base().doc_count
    }

    /// Named sub-aggregation results.
    fn aggregations(&self) -> &BTreeMap<String, Aggregate> {
        &self.bucket_base().aggregations
    }

    fn aggregation(&self, name: &str) -> Option<&Aggregate> {
        self.bucket_base().aggregations.get(name)
    }
}

pub trait BucketSetters {
    fn bucket_base_mut(&mut self) -> &mut BucketBaseBuilder;

    fn doc_count(&mut self, doc_count: i64) -> &mut Self {
        self.bucket_base_mut().doc_count = Some(doc_count);
        self
    }

    /// Replaces the sub-aggregation results.
    fn aggregations(&mut self, aggregations: BTreeMap<String, Aggregate>) -> &mut Self {
        self.bucket_base_mut().aggregations = aggregations;
        self
    }

    /// Puts one named sub-aggregation result.
    fn aggregation(&mut self, name: impl Into<String>, aggregate: impl Into<Aggregate>) -> &mut Self {
        self.bucket_base_mut().aggregations.insert(name.into(), aggregate.into());
        self
    }

    /// Merges named sub-aggregation results.
    fn extend_aggregations(&mut self, entries: impl IntoIterator<Item = (String, Aggregate)>) -> &mut Self {
        self.bucket_base_mut().aggregations.extend(entries);
        self
    }
}

pub(crate) fn setup_bucket<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: BucketFields,
    B: BucketSetters,
{
    codec.add(
        "doc_count",
        |b, r| {
            b.doc_count(r.read_i64()?);
            Ok(())
        },
        |v, w| w.write_field("doc_count", &v.doc_count()),
    );
    codec.set_extension(
        |b, key, r| {
            // Same replacement rule as `read_aggregate_map`.
            let (name, aggregate) = decode_typed_aggregate(key, r)?;
            b.aggregation(name, aggregate);
            Ok(())
        },
        |v, w| write_aggregate_members(w, v.aggregations()),
    );
}

// =============================================================================
// MULTI BUCKET
// =============================================================================

/// The `buckets` of a multi-bucket aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBucketAggregateBase<K> {
    pub(crate) buckets: Buckets<K>,
}

#[derive(Debug, Clone)]
pub struct MultiBucketAggregateBaseBuilder<K> {
    buckets: Option<Buckets<K>>,
}

impl<K> Default for MultiBucketAggregateBaseBuilder<K> {
    fn default() -> Self {
        Self { buckets: None }
    }
}

impl<K> MultiBucketAggregateBaseBuilder<K> {
    pub(crate) fn build_base(&mut self, type_name: &'static str) -> Result<MultiBucketAggregateBase<K>, BuildError> {
        Ok(MultiBucketAggregateBase {
            buckets: require(self.buckets.take(), type_name, "buckets")?,
        })
    }
}

pub trait MultiBucketFields {
    type Bucket;

    fn multi_bucket_base(&self) -> &MultiBucketAggregateBase<Self::Bucket>;

    fn buckets(&self) -> &Buckets<Self::Bucket> {
        &self.multi_bucket_base().buckets
    }
}

pub trait MultiBucketSetters {
    type Bucket;

    fn multi_bucket_base_mut(&mut self) -> &mut MultiBucketAggregateBaseBuilder<Self::Bucket>;

    fn buckets(&mut self, buckets: impl Into<Buckets<Self::Bucket>>) -> &mut Self {
        self.multi_bucket_base_mut().buckets = Some(buckets.into());
        self
    }
}

pub(crate) fn setup_multi_bucket_aggregate<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: AggregateFields + MultiBucketFields,
    T::Bucket: Encode,
    B: AggregateSetters + MultiBucketSetters,
    B::Bucket: Decode,
{
    setup_aggregate(codec);
    codec.add(
        "buckets",
        |b, r| {
            b.buckets(Buckets::<B::Bucket>::decode(r)?);
            Ok(())
        },
        |v, w| w.write_field("buckets", v.buckets()),
    );
}

// =============================================================================
// TERMS
// =============================================================================

/// Accuracy counters reported by `terms` aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsAggregateBase {
    pub(crate) doc_count_error_upper_bound: Option<i64>,
    pub(crate) sum_other_doc_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TermsAggregateBaseBuilder {
    doc_count_error_upper_bound: Option<i64>,
    sum_other_doc_count: Option<i64>,
}

impl TermsAggregateBaseBuilder {
    pub(crate) fn build_base(&mut self, type_name: &'static str) -> Result<TermsAggregateBase, BuildError> {
        Ok(TermsAggregateBase {
            doc_count_error_upper_bound: self.doc_count_error_upper_bound.take(),
            sum_other_doc_count: require(self.sum_other_doc_count.take(), type_name, "sum_other_doc_count")?,
        })
    }
}

pub trait TermsFields {
    fn terms_base(&self) -> &TermsAggregateBase;

    fn doc_count_error_upper_bound(&self) -> Option<i64> {
        self.terms_base().doc_count_error_upper_bound
    }

    /// Documents in buckets that did not make the top `size`.
    fn sum_other_doc_count(&self) -> i64 {
        self.terms_base().sum_other_doc_count
    }
}

pub trait TermsSetters {
    fn terms_base_mut(&mut self) -> &mut TermsAggregateBaseBuilder;

    fn doc_count_error_upper_bound(&mut self, value: i64) -> &mut Self {
        self.terms_base_mut().doc_count_error_upper_bound = Some(value);
        self
    }

    fn sum_other_doc_count(&mut self, value: i64) -> &mut Self {
        self.terms_base_mut().sum_other_doc_count = Some(value);
        self
    }
}

pub(crate) fn setup_terms_aggregate<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: AggregateFields + MultiBucketFields + TermsFields,
    T::Bucket: Encode,
    B: AggregateSetters + MultiBucketSetters + TermsSetters,
    B::Bucket: Decode,
{
    setup_multi_bucket_aggregate(codec);
    codec
        .add(
            "doc_count_error_upper_bound",
            |b, r| {
                b.doc_count_error_upper_bound(r.read_i64()?);
                Ok(())
            },
            |v, w| w.write_optional_field("doc_count_error_upper_bound", v.doc_count_error_upper_bound().as_ref()),
        )
        .add(
            "sum_other_doc_count",
            |b, r| {
                b.sum_other_doc_count(r.read_i64()?);
                Ok(())
            },
            |v, w| w.write_field("sum_other_doc_count", &v.sum_other_doc_count()),
        );
}

// =============================================================================
// PERCENTILES
// =============================================================================

/// The `values` of a percentiles aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentilesAggregateBase {
    pub(crate) values: Percentiles,
}

#[derive(Debug, Clone, Default)]
pub struct PercentilesAggregateBaseBuilder {
    values: Option<Percentiles>,
}

impl PercentilesAggregateBaseBuilder {
    pub(crate) fn build_base(&mut self, type_name: &'static str) -> Result<PercentilesAggregateBase, BuildError> {
        Ok(PercentilesAggregateBase {
            values: require(self.values.take(), type_name, "values")?,
        })
    }
}

pub trait PercentilesFields {
    fn percentiles_base(&self) -> &PercentilesAggregateBase;

    fn values(&self) -> &Percentiles {
        &self.percentiles_base().values
    }
}

pub trait PercentilesSetters {
    fn percentiles_base_mut(&mut self) -> &mut PercentilesAggregateBaseBuilder;

    fn values(&mut self, values: Percentiles) -> &mut Self {
        self.percentiles_base_mut().values = Some(values);
        self
    }
}

pub(crate) fn setup_percentiles_aggregate<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: AggregateFields + PercentilesFields,
    B: AggregateSetters + PercentilesSetters,
{
    setup_aggregate(codec);
    codec.add(
        "values",
        |b, r| {
            b.values(Percentiles::decode(r)?);
            Ok(())
        },
        |v, w| w.write_field("values", v.values()),
    );
}
