//! Aggregate results.
//!
//! [`Aggregate`] is the closed family of result kinds a search response can
//! carry. The kind is not part of the result body: it travels in the
//! typed key (`sterms#by_tag`) and selects the decoder from a registry.

mod base;
mod bucket;
mod bucket_aggregate;
mod metric;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::codec::{Encode, JsonEnum, Reader, TaggedUnion, Writer};
use crate::error::{DecodeError, EncodeError, VariantMismatch};

pub use base::{
    AggregateBase, AggregateFields, AggregateSetters, BucketBase, BucketBaseBuilder, BucketFields, BucketSetters,
    MultiBucketAggregateBase, MultiBucketAggregateBaseBuilder, MultiBucketFields, MultiBucketSetters,
    PercentilesAggregateBase, PercentilesAggregateBaseBuilder, PercentilesFields, PercentilesSetters,
    SingleMetricAggregateBase, SingleMetricAggregateBaseBuilder, SingleMetricFields, SingleMetricSetters,
    TermsAggregateBase, TermsAggregateBaseBuilder, TermsFields, TermsSetters,
};
pub use bucket::{
    DateHistogramBucket, DateHistogramBucketBuilder, DoubleTermsBucket, DoubleTermsBucketBuilder, FiltersBucket,
    FiltersBucketBuilder, HistogramBucket, HistogramBucketBuilder, LongTermsBucket, LongTermsBucketBuilder,
    RangeBucket, RangeBucketBuilder, StringTermsBucket, StringTermsBucketBuilder,
};
pub use bucket_aggregate::{
    DateHistogramAggregate, DateHistogramAggregateBuilder, DoubleTermsAggregate, DoubleTermsAggregateBuilder,
    FilterAggregate, FilterAggregateBuilder, FiltersAggregate, FiltersAggregateBuilder, GlobalAggregate,
    GlobalAggregateBuilder, HistogramAggregate, HistogramAggregateBuilder, LongTermsAggregate,
    LongTermsAggregateBuilder, MissingAggregate, MissingAggregateBuilder, RangeAggregate, RangeAggregateBuilder,
    StringTermsAggregate, StringTermsAggregateBuilder,
};
pub use metric::{
    AvgAggregate, AvgAggregateBuilder, CardinalityAggregate, CardinalityAggregateBuilder, DerivativeAggregate,
    DerivativeAggregateBuilder, HdrPercentilesAggregate, HdrPercentilesAggregateBuilder, MaxAggregate,
    MaxAggregateBuilder, MedianAbsoluteDeviationAggregate, MedianAbsoluteDeviationAggregateBuilder, MinAggregate,
    MinAggregateBuilder, SimpleValueAggregate, SimpleValueAggregateBuilder, StatsAggregate, StatsAggregateBuilder,
    SumAggregate, SumAggregateBuilder, TDigestPercentilesAggregate, TDigestPercentilesAggregateBuilder,
    ValueCountAggregate, ValueCountAggregateBuilder, WeightedAvgAggregate, WeightedAvgAggregateBuilder,
};

type KindDecoder = for<'a> fn(&mut Reader<'a>) -> Result<Aggregate, DecodeError>;

/// Declares the `Aggregate` family: the enum, its kind enum, the
/// per-variant accessors, and the kind registry.
macro_rules! aggregate_family {
    ($($variant:ident($ty:ty) => $kind:literal, $is:ident, $get:ident;)*) => {
        /// One aggregate result, tagged by kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Aggregate {
            $($variant($ty),)*
        }

        /// Kind of an aggregate result, as written in typed keys.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AggregateKind {
            $($variant,)*
        }

        impl JsonEnum for AggregateKind {
            const NAME: &'static str = "AggregateKind";
            const VARIANTS: &'static [Self] = &[$(AggregateKind::$variant,)*];

            fn json_value(&self) -> &'static str {
                match self {
                    $(AggregateKind::$variant => $kind,)*
                }
            }
        }

        impl Aggregate {
            /// Returns the kind of the stored result.
            pub fn kind(&self) -> AggregateKind {
                match self {
                    $(Aggregate::$variant(_) => AggregateKind::$variant,)*
                }
            }

            $(
                pub fn $is(&self) -> bool {
                    matches!(self, Aggregate::$variant(_))
                }

                pub fn $get(&self) -> Result<&$ty, VariantMismatch> {
                    match self {
                        Aggregate::$variant(value) => Ok(value),
                        _ => Err(self.mismatch($kind)),
                    }
                }
            )*
        }

        impl Encode for Aggregate {
            fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
                match self {
                    $(Aggregate::$variant(value) => value.encode(writer),)*
                }
            }
        }

        $(
            impl From<$ty> for Aggregate {
                fn from(value: $ty) -> Self {
                    Aggregate::$variant(value)
                }
            }
        )*

        lazy_static! {
            static ref KIND_REGISTRY: FxHashMap<&'static str, KindDecoder> = {
                let mut registry: FxHashMap<&'static str, KindDecoder> = FxHashMap::default();
                $(
                    registry.insert($kind, |r| <$ty as crate::codec::Decode>::decode(r).map(Aggregate::$variant));
                )*
                registry
            };
        }
    };
}

aggregate_family! {
    Avg(AvgAggregate) => "avg", is_avg, avg;
    Sum(SumAggregate) => "sum", is_sum, sum;
    Min(MinAggregate) => "min", is_min, min;
    Max(MaxAggregate) => "max", is_max, max;
    ValueCount(ValueCountAggregate) => "value_count", is_value_count, value_count;
    WeightedAvg(WeightedAvgAggregate) => "weighted_avg", is_weighted_avg, weighted_avg;
    MedianAbsoluteDeviation(MedianAbsoluteDeviationAggregate) => "median_absolute_deviation",
        is_median_absolute_deviation, median_absolute_deviation;
    SimpleValue(SimpleValueAggregate) => "simple_value", is_simple_value, simple_value;
    Derivative(DerivativeAggregate) => "derivative", is_derivative, derivative;
    Cardinality(CardinalityAggregate) => "cardinality", is_cardinality, cardinality;
    Stats(StatsAggregate) => "stats", is_stats, stats;
    TDigestPercentiles(TDigestPercentilesAggregate) => "tdigest_percentiles",
        is_tdigest_percentiles, tdigest_percentiles;
    HdrPercentiles(HdrPercentilesAggregate) => "hdr_percentiles", is_hdr_percentiles, hdr_percentiles;
    Sterms(StringTermsAggregate) => "sterms", is_sterms, sterms;
    Lterms(LongTermsAggregate) => "lterms", is_lterms, lterms;
    Dterms(DoubleTermsAggregate) => "dterms", is_dterms, dterms;
    Histogram(HistogramAggregate) => "histogram", is_histogram, histogram;
    DateHistogram(DateHistogramAggregate) => "date_histogram", is_date_histogram, date_histogram;
    Range(RangeAggregate) => "range", is_range, range;
    Filters(FiltersAggregate) => "filters", is_filters, filters;
    Filter(FilterAggregate) => "filter", is_filter, filter;
    Global(GlobalAggregate) => "global", is_global, global;
    Missing(MissingAggregate) => "missing", is_missing, missing;
}

impl Aggregate {
    /// Decodes a result body of the named kind.
    ///
    /// Fails with `UnrecognizedKind` if the kind is not registered.
    pub fn decode_kind(kind: &str, reader: &mut Reader<'_>) -> Result<Aggregate, DecodeError> {
        match KIND_REGISTRY.get(kind) {
            Some(decode) => decode(reader),
            None => Err(DecodeError::UnrecognizedKind {
                kind: kind.to_string(),
                path: reader.path(),
            }),
        }
    }

    /// Returns true if `kind` names a registered result kind.
    pub fn is_registered_kind(kind: &str) -> bool {
        KIND_REGISTRY.contains_key(kind)
    }
}

impl TaggedUnion for Aggregate {
    const UNION_NAME: &'static str = "Aggregate";

    fn variant_tag(&self) -> &'static str {
        self.kind().json_value()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_registry_covers_every_kind() {
        for kind in AggregateKind::VARIANTS {
            assert!(Aggregate::is_registered_kind(kind.json_value()), "{kind:?}");
            assert_eq!(AggregateKind::from_json_value(kind.json_value()), Some(*kind));
        }
        assert!(!Aggregate::is_registered_kind("terms"));
    }

    #[test]
    fn test_decode_kind() {
        let value = json!({"value": 3});
        let aggregate = Aggregate::decode_kind("value_count", &mut Reader::new(&value)).unwrap();
        assert_eq!(aggregate.kind(), AggregateKind::ValueCount);
        assert!(aggregate.value_count().is_ok());

        let err = aggregate.avg().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VariantMismatch);
        assert_eq!((err.requested, err.actual), ("avg", "value_count"));

        let err = Aggregate::decode_kind("bogus_kind", &mut Reader::new(&value)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
    }
}
