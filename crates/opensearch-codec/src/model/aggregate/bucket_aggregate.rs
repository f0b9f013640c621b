//! Bucket aggregate results: multi-bucket (`terms`, `histogram`, `range`,
//! `filters`) and single-bucket (`filter`, `global`, `missing`).

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, ObjectCodec, Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::model::aggregate::base::{
    AggregateBase, AggregateFields, AggregateSetters, BucketBase, BucketBaseBuilder, BucketFields, BucketSetters,
    MultiBucketAggregateBase, MultiBucketAggregateBaseBuilder, MultiBucketFields, MultiBucketSetters,
    TermsAggregateBase, TermsAggregateBaseBuilder, TermsFields, TermsSetters, setup_aggregate, setup_bucket,
    setup_multi_bucket_aggregate, setup_terms_aggregate,
};
use crate::model::aggregate::bucket::{
    DateHistogramBucket, DoubleTermsBucket, FiltersBucket, HistogramBucket, LongTermsBucket, RangeBucket,
    StringTermsBucket,
};
use crate::model::builder::SingleUse;

/// Glue shared by every multi-bucket aggregate: base trait impls, the
/// builder's terminal step, and `Encode`/`Decode` through the codec table.
macro_rules! multi_bucket_common {
    ($name:ident, $builder:ident, $bucket:ty, $codec:ident) => {
        impl $name {
            pub fn builder() -> $builder {
                $builder::new()
            }
        }

        impl AggregateFields for $name {
            fn aggregate_base(&self) -> &AggregateBase {
                &self.base
            }
        }

        impl MultiBucketFields for $name {
            type Bucket = $bucket;

            fn multi_bucket_base(&self) -> &MultiBucketAggregateBase<$bucket> {
                &self.multi_bucket
            }
        }

        impl AggregateSetters for $builder {
            fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
                &mut self.base
            }
        }

        impl MultiBucketSetters for $builder {
            type Bucket = $bucket;

            fn multi_bucket_base_mut(&mut self) -> &mut MultiBucketAggregateBaseBuilder<$bucket> {
                &mut self.multi_bucket
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
// TERMS
// =============================================================================

macro_rules! terms_aggregate {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $bucket:ty, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: AggregateBase,
            multi_bucket: MultiBucketAggregateBase<$bucket>,
            terms: TermsAggregateBase,
        }

        impl TermsFields for $name {
            fn terms_base(&self) -> &TermsAggregateBase {
                &self.terms
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: AggregateBase,
            multi_bucket: MultiBucketAggregateBaseBuilder<$bucket>,
            terms: TermsAggregateBaseBuilder,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                    multi_bucket: self.multi_bucket.build_base(stringify!($name))?,
                    terms: self.terms.build_base(stringify!($name))?,
                })
            }
        }

        impl TermsSetters for $builder {
            fn terms_base_mut(&mut self) -> &mut TermsAggregateBaseBuilder {
                &mut self.terms
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_terms_aggregate(&mut codec);
                codec
            };
        }

        multi_bucket_common!($name, $builder, $bucket, $codec);
    };
}

terms_aggregate!(
    /// Result of a `terms` aggregation over a keyword field (`sterms`).
    StringTermsAggregate,
    StringTermsAggregateBuilder,
    StringTermsBucket,
    STRING_TERMS_AGGREGATE_CODEC
);
terms_aggregate!(
    /// Result of a `terms` aggregation over an integer field (`lterms`).
    LongTermsAggregate,
    LongTermsAggregateBuilder,
    LongTermsBucket,
    LONG_TERMS_AGGREGATE_CODEC
);
terms_aggregate!(
    /// Result of a `terms` aggregation over a floating point field (`dterms`).
    DoubleTermsAggregate,
    DoubleTermsAggregateBuilder,
    DoubleTermsBucket,
    DOUBLE_TERMS_AGGREGATE_CODEC
);

// =============================================================================
// HISTOGRAM, RANGE, FILTERS
// =============================================================================

macro_rules! multi_bucket_aggregate {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $bucket:ty, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: AggregateBase,
            multi_bucket: MultiBucketAggregateBase<$bucket>,
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: AggregateBase,
            multi_bucket: MultiBucketAggregateBaseBuilder<$bucket>,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                    multi_bucket: self.multi_bucket.build_base(stringify!($name))?,
                })
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_multi_bucket_aggregate(&mut codec);
                codec
            };
        }

        multi_bucket_common!($name, $builder, $bucket, $codec);
    };
}

multi_bucket_aggregate!(
    /// Result of a `histogram` aggregation.
    HistogramAggregate,
    HistogramAggregateBuilder,
    HistogramBucket,
    HISTOGRAM_AGGREGATE_CODEC
);
multi_bucket_aggregate!(
    /// Result of a `date_histogram` aggregation.
    DateHistogramAggregate,
    DateHistogramAggregateBuilder,
    DateHistogramBucket,
    DATE_HISTOGRAM_AGGREGATE_CODEC
);
multi_bucket_aggregate!(
    /// Result of a `range` aggregation.
    RangeAggregate,
    RangeAggregateBuilder,
    RangeBucket,
    RANGE_AGGREGATE_CODEC
);
multi_bucket_aggregate!(
    /// Result of a `filters` aggregation. Named filters produce keyed buckets.
    FiltersAggregate,
    FiltersAggregateBuilder,
    FiltersBucket,
    FILTERS_AGGREGATE_CODEC
);

// =============================================================================
// SINGLE BUCKET
// =============================================================================

macro_rules! single_bucket_aggregate {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: AggregateBase,
            bucket: BucketBase,
        }

        impl $name {
            pub fn builder() -> $builder {
                $builder::new()
            }
        }

        impl AggregateFields for $name {
            fn aggregate_base(&self) -> &AggregateBase {
                &self.base
            }
        }

        impl BucketFields for $name {
            fn bucket_base(&self) -> &BucketBase {
                &self.bucket
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: AggregateBase,
            bucket: BucketBaseBuilder,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                    bucket: self.bucket.build_base(stringify!($name))?,
                })
            }
        }

        impl AggregateSetters for $builder {
            fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
                &mut self.base
            }
        }

        impl BucketSetters for $builder {
            fn bucket_base_mut(&mut self) -> &mut BucketBaseBuilder {
                &mut self.bucket
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_aggregate(&mut codec);
                setup_bucket(&mut codec);
                codec
            };
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

single_bucket_aggregate!(
    /// Result of a `filter` aggregation.
    FilterAggregate,
    FilterAggregateBuilder,
    FILTER_AGGREGATE_CODEC
);
single_bucket_aggregate!(
    /// Result of a `global` aggregation.
    GlobalAggregate,
    GlobalAggregateBuilder,
    GLOBAL_AGGREGATE_CODEC
);
single_bucket_aggregate!(
    /// Result of a `missing` aggregation.
    MissingAggregate,
    MissingAggregateBuilder,
    MISSING_AGGREGATE_CODEC
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;
    use crate::model::Buckets;
    use crate::model::aggregate::AvgAggregate;
    use crate::prelude::*;

    #[test]
    fn test_terms_with_nested_results() {
        let input = json!({
            "doc_count_error_upper_bound": 0,
            "sum_other_doc_count": 12,
            "buckets": [
                {"key": "rust", "doc_count": 5, "avg#latency": {"value": 3.0}},
                {"key": "go", "doc_count": 2, "avg#latency": {"value": null}}
            ]
        });
        let terms: StringTermsAggregate = decode_value(&input).unwrap();
        assert_eq!(terms.sum_other_doc_count(), 12);
        assert_eq!(terms.doc_count_error_upper_bound(), Some(0));
        let buckets = terms.buckets().array().unwrap();
        assert_eq!(buckets[1].key(), "go");
        let latency = buckets[1].aggregation("latency").unwrap().avg().unwrap();
        assert_eq!(latency.value(), 0.0);

        let again: StringTermsAggregate = decode_value(&encode_value(&terms).unwrap()).unwrap();
        assert_eq!(again, terms);
    }

    #[test]
    fn test_keyed_range_buckets() {
        let input = json!({
            "buckets": {
                "cheap": {"to": 10.0, "doc_count": 3},
                "pricey": {"from": 10.0, "doc_count": 1}
            }
        });
        let range: RangeAggregate = decode_value(&input).unwrap();
        assert!(range.buckets().is_keyed());
        assert_eq!(range.buckets().keyed().unwrap()["pricey"].from(), Some(10.0));
        assert_eq!(
            range.buckets().array().unwrap_err().kind(),
            ErrorKind::VariantMismatch
        );
    }

    #[test]
    fn test_terms_requires_sum_other_doc_count() {
        let err = decode_value::<LongTermsAggregate>(&json!({"buckets": []})).unwrap_err();
        assert!(err.to_string().contains("sum_other_doc_count"));
    }

    #[test]
    fn test_single_bucket_builder() {
        let avg = AvgAggregate::builder().value(4.0).build().unwrap();
        let filter = FilterAggregate::builder()
            .doc_count(10)
            .aggregation("avg_price", avg)
            .meta_entry("source", json!("ui"))
            .build()
            .unwrap();
        assert_eq!(
            encode_value(&filter).unwrap(),
            json!({"meta": {"source": "ui"}, "doc_count": 10, "avg#avg_price": {"value": 4}})
        );
    }

    #[test]
    fn test_histogram_builder() {
        let bucket = HistogramBucket::builder().key(0.0).doc_count(3).build().unwrap();
        let histogram = HistogramAggregate::builder()
            .buckets(vec![bucket])
            .build()
            .unwrap();
        assert!(matches!(histogram.buckets(), Buckets::Array(items) if items.len() == 1));
        assert_eq!(
            encode_value(&histogram).unwrap(),
            json!({"buckets": [{"doc_count": 3, "key": 0}]})
        );
    }
}
