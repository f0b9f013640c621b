//! Metric aggregate results.

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, ObjectCodec, Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::model::aggregate::base::{
    AggregateBase, AggregateFields, AggregateSetters, PercentilesAggregateBase, PercentilesAggregateBaseBuilder,
    PercentilesFields, PercentilesSetters, SingleMetricAggregateBase, SingleMetricAggregateBaseBuilder,
    SingleMetricFields, SingleMetricSetters, setup_aggregate, setup_percentiles_aggregate,
    setup_single_metric_aggregate,
};
use crate::model::builder::{SingleUse, require};

/// Declares a result type that is exactly the single-metric field set.
macro_rules! single_metric_aggregate {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: AggregateBase,
            metric: SingleMetricAggregateBase,
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

        impl SingleMetricFields for $name {
            fn single_metric_base(&self) -> &SingleMetricAggregateBase {
                &self.metric
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: AggregateBase,
            metric: SingleMetricAggregateBaseBuilder,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                    metric: self.metric.build_base(stringify!($name))?,
                })
            }
        }

        impl AggregateSetters for $builder {
            fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
                &mut self.base
            }
        }

        impl SingleMetricSetters for $builder {
            fn single_metric_base_mut(&mut self) -> &mut SingleMetricAggregateBaseBuilder {
                &mut self.metric
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_single_metric_aggregate(&mut codec);
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

single_metric_aggregate!(
    /// Result of an `avg` aggregation.
    AvgAggregate,
    AvgAggregateBuilder,
    AVG_AGGREGATE_CODEC
);
single_metric_aggregate!(SumAggregate, SumAggregateBuilder, SUM_AGGREGATE_CODEC);
single_metric_aggregate!(MinAggregate, MinAggregateBuilder, MIN_AGGREGATE_CODEC);
single_metric_aggregate!(MaxAggregate, MaxAggregateBuilder, MAX_AGGREGATE_CODEC);
single_metric_aggregate!(
    /// Result of a `value_count` aggregation. The count is reported as a double.
    ValueCountAggregate,
    ValueCountAggregateBuilder,
    VALUE_COUNT_AGGREGATE_CODEC
);
single_metric_aggregate!(WeightedAvgAggregate, WeightedAvgAggregateBuilder, WEIGHTED_AVG_AGGREGATE_CODEC);
single_metric_aggregate!(
    MedianAbsoluteDeviationAggregate,
    MedianAbsoluteDeviationAggregateBuilder,
    MEDIAN_ABSOLUTE_DEVIATION_AGGREGATE_CODEC
);
single_metric_aggregate!(
    /// Result of pipeline aggregations that produce one number (`bucket_script`, `sum_bucket`).
    SimpleValueAggregate,
    SimpleValueAggregateBuilder,
    SIMPLE_VALUE_AGGREGATE_CODEC
);

// =============================================================================
// DERIVATIVE
// =============================================================================

/// Result of a `derivative` pipeline aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeAggregate {
    base: AggregateBase,
    metric: SingleMetricAggregateBase,
    normalized_value: Option<f64>,
    normalized_value_as_string: Option<String>,
}

impl DerivativeAggregate {
    pub fn builder() -> DerivativeAggregateBuilder {
        DerivativeAggregateBuilder::new()
    }

    /// Derivative scaled to the requested `unit`.
    pub fn normalized_value(&self) -> Option<f64> {
        self.normalized_value
    }

    pub fn normalized_value_as_string(&self) -> Option<&str> {
        self.normalized_value_as_string.as_deref()
    }
}

impl AggregateFields for DerivativeAggregate {
    fn aggregate_base(&self) -> &AggregateBase {
        &self.base
    }
}

impl SingleMetricFields for DerivativeAggregate {
    fn single_metric_base(&self) -> &SingleMetricAggregateBase {
        &self.metric
    }
}

/// Builder for [`DerivativeAggregate`].
#[derive(Debug, Clone, Default)]
pub struct DerivativeAggregateBuilder {
    guard: SingleUse,
    base: AggregateBase,
    metric: SingleMetricAggregateBaseBuilder,
    normalized_value: Option<f64>,
    normalized_value_as_string: Option<String>,
}

impl DerivativeAggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalized_value(&mut self, value: f64) -> &mut Self {
        self.normalized_value = Some(value);
        self
    }

    pub fn normalized_value_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.normalized_value_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<DerivativeAggregate, BuildError> {
        self.guard.consume("DerivativeAggregate")?;
        Ok(DerivativeAggregate {
            base: std::mem::take(&mut self.base),
            metric: self.metric.build_base("DerivativeAggregate")?,
            normalized_value: self.normalized_value.take(),
            normalized_value_as_string: self.normalized_value_as_string.take(),
        })
    }
}

impl AggregateSetters for DerivativeAggregateBuilder {
    fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}

impl SingleMetricSetters for DerivativeAggregateBuilder {
    fn single_metric_base_mut(&mut self) -> &mut SingleMetricAggregateBaseBuilder {
        &mut self.metric
    }
}

lazy_static! {
    static ref DERIVATIVE_AGGREGATE_CODEC: ObjectCodec<DerivativeAggregate, DerivativeAggregateBuilder> = {
        let mut codec = ObjectCodec::new(
            "DerivativeAggregate",
            DerivativeAggregateBuilder::new,
            DerivativeAggregateBuilder::build,
        );
        setup_single_metric_aggregate(&mut codec);
        codec
            .add(
                "normalized_value",
                |b, r| {
                    b.normalized_value(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("normalized_value", v.normalized_value.as_ref()),
            )
            .add(
                "normalized_value_as_string",
                |b, r| {
                    b.normalized_value_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("normalized_value_as_string", v.normalized_value_as_string.as_ref()),
            );
        codec
    };
}

impl Encode for DerivativeAggregate {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        DERIVATIVE_AGGREGATE_CODEC.encode(self, writer)
    }
}

impl Decode for DerivativeAggregate {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        DERIVATIVE_AGGREGATE_CODEC.decode(reader)
    }
}

// =============================================================================
// CARDINALITY
// =============================================================================

/// Result of a `cardinality` aggregation: an approximate distinct count.
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalityAggregate {
    base: AggregateBase,
    value: i64,
}

impl CardinalityAggregate {
    pub fn builder() -> CardinalityAggregateBuilder {
        CardinalityAggregateBuilder::new()
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl AggregateFields for CardinalityAggregate {
    fn aggregate_base(&self) -> &AggregateBase {
        &self.base
    }
}

/// Builder for [`CardinalityAggregate`].
#[derive(Debug, Clone, Default)]
pub struct CardinalityAggregateBuilder {
    guard: SingleUse,
    base: AggregateBase,
    value: Option<i64>,
}

impl CardinalityAggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&mut self, value: i64) -> &mut Self {
        self.value = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<CardinalityAggregate, BuildError> {
        self.guard.consume("CardinalityAggregate")?;
        Ok(CardinalityAggregate {
            base: std::mem::take(&mut self.base),
            value: require(self.value.take(), "CardinalityAggregate", "value")?,
        })
    }
}

impl AggregateSetters for CardinalityAggregateBuilder {
    fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}

lazy_static! {
    static ref CARDINALITY_AGGREGATE_CODEC: ObjectCodec<CardinalityAggregate, CardinalityAggregateBuilder> = {
        let mut codec = ObjectCodec::new(
            "CardinalityAggregate",
            CardinalityAggregateBuilder::new,
            CardinalityAggregateBuilder::build,
        );
        setup_aggregate(&mut codec);
        codec.add(
            "value",
            |b, r| {
                b.value(r.read_i64()?);
                Ok(())
            },
            |v, w| w.write_field("value", &v.value),
        );
        codec
    };
}

impl Encode for CardinalityAggregate {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        CARDINALITY_AGGREGATE_CODEC.encode(self, writer)
    }
}

impl Decode for CardinalityAggregate {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        CARDINALITY_AGGREGATE_CODEC.decode(reader)
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Result of a `stats` aggregation.
///
/// Over an empty set the server reports `min`, `max` and `avg` as `null`;
/// they decode to `0.0` and `count` tells the two cases apart.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsAggregate {
    base: AggregateBase,
    count: i64,
    min: f64,
    max: f64,
    avg: f64,
    sum: f64,
    min_as_string: Option<String>,
    max_as_string: Option<String>,
    avg_as_string: Option<String>,
    sum_as_string: Option<String>,
}

impl StatsAggregate {
    pub fn builder() -> StatsAggregateBuilder {
        StatsAggregateBuilder::new()
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn avg(&self) -> f64 {
        self.avg
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn min_as_string(&self) -> Option<&str> {
        self.min_as_string.as_deref()
    }

    pub fn max_as_string(&self) -> Option<&str> {
        self.max_as_string.as_deref()
    }

    pub fn avg_as_string(&self) -> Option<&str> {
        self.avg_as_string.as_deref()
    }

    pub fn sum_as_string(&self) -> Option<&str> {
        self.sum_as_string.as_deref()
    }
}

impl AggregateFields for StatsAggregate {
    fn aggregate_base(&self) -> &AggregateBase {
        &self.base
    }
}

/// Builder for [`StatsAggregate`].
#[derive(Debug, Clone, Default)]
pub struct StatsAggregateBuilder {
    guard: SingleUse,
    base: AggregateBase,
    count: Option<i64>,
    min: Option<f64>,
    max: Option<f64>,
    avg: Option<f64>,
    sum: Option<f64>,
    min_as_string: Option<String>,
    max_as_string: Option<String>,
    avg_as_string: Option<String>,
    sum_as_string: Option<String>,
}

impl StatsAggregateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, value: i64) -> &mut Self {
        self.count = Some(value);
        self
    }

    pub fn min(&mut self, value: f64) -> &mut Self {
        self.min = Some(value);
        self
    }

    pub fn max(&mut self, value: f64) -> &mut Self {
        self.max = Some(value);
        self
    }

    pub fn avg(&mut self, value: f64) -> &mut Self {
        self.avg = Some(value);
        self
    }

    pub fn sum(&mut self, value: f64) -> &mut Self {
        self.sum = Some(value);
        self
    }

    pub fn min_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.min_as_string = Some(value.into());
        self
    }

    pub fn max_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.max_as_string = Some(value.into());
        self
    }

    pub fn avg_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.avg_as_string = Some(value.into());
        self
    }

    pub fn sum_as_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.sum_as_string = Some(value.into());
        self
    }

    pub fn build(&mut self) -> Result<StatsAggregate, BuildError> {
        const TYPE_NAME: &str = "StatsAggregate";
        self.guard.consume(TYPE_NAME)?;
        Ok(StatsAggregate {
            base: std::mem::take(&mut self.base),
            count: require(self.count.take(), TYPE_NAME, "count")?,
            min: require(self.min.take(), TYPE_NAME, "min")?,
            max: require(self.max.take(), TYPE_NAME, "max")?,
            avg: require(self.avg.take(), TYPE_NAME, "avg")?,
            sum: require(self.sum.take(), TYPE_NAME, "sum")?,
            min_as_string: self.min_as_string.take(),
            max_as_string: self.max_as_string.take(),
            avg_as_string: self.avg_as_string.take(),
            sum_as_string: self.sum_as_string.take(),
        })
    }
}

impl AggregateSetters for StatsAggregateBuilder {
    fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
        &mut self.base
    }
}

lazy_static! {
    static ref STATS_AGGREGATE_CODEC: ObjectCodec<StatsAggregate, StatsAggregateBuilder> = {
        let mut codec = ObjectCodec::new("StatsAggregate", StatsAggregateBuilder::new, StatsAggregateBuilder::build);
        setup_aggregate(&mut codec);
        codec
            .add(
                "count",
                |b, r| {
                    b.count(r.read_i64()?);
                    Ok(())
                },
                |v, w| w.write_field("count", &v.count),
            )
            .add(
                "min",
                |b, r| {
                    b.min(r.read_f64_or_null(0.0)?);
                    Ok(())
                },
                |v, w| w.write_field("min", &v.min),
            )
            .add(
                "max",
                |b, r| {
                    b.max(r.read_f64_or_null(0.0)?);
                    Ok(())
                },
                |v, w| w.write_field("max", &v.max),
            )
            .add(
                "avg",
                |b, r| {
                    b.avg(r.read_f64_or_null(0.0)?);
                    Ok(())
                },
                |v, w| w.write_field("avg", &v.avg),
            )
            .add(
                "sum",
                |b, r| {
                    b.sum(r.read_f64()?);
                    Ok(())
                },
                |v, w| w.write_field("sum", &v.sum),
            )
            .add(
                "min_as_string",
                |b, r| {
                    b.min_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("min_as_string", v.min_as_string.as_ref()),
            )
            .add(
                "max_as_string",
                |b, r| {
                    b.max_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("max_as_string", v.max_as_string.as_ref()),
            )
            .add(
                "avg_as_string",
                |b, r| {
                    b.avg_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("avg_as_string", v.avg_as_string.as_ref()),
            )
            .add(
                "sum_as_string",
                |b, r| {
                    b.sum_as_string(r.read_string()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("sum_as_string", v.sum_as_string.as_ref()),
            );
        codec
    };
}

impl Encode for StatsAggregate {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        STATS_AGGREGATE_CODEC.encode(self, writer)
    }
}

impl Decode for StatsAggregate {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        STATS_AGGREGATE_CODEC.decode(reader)
    }
}

// =============================================================================
// PERCENTILES
// =============================================================================

macro_rules! percentiles_aggregate {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            base: AggregateBase,
            percentiles: PercentilesAggregateBase,
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

        impl PercentilesFields for $name {
            fn percentiles_base(&self) -> &PercentilesAggregateBase {
                &self.percentiles
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: AggregateBase,
            percentiles: PercentilesAggregateBaseBuilder,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                    percentiles: self.percentiles.build_base(stringify!($name))?,
                })
            }
        }

        impl AggregateSetters for $builder {
            fn aggregate_base_mut(&mut self) -> &mut AggregateBase {
                &mut self.base
            }
        }

        impl PercentilesSetters for $builder {
            fn percentiles_base_mut(&mut self) -> &mut PercentilesAggregateBaseBuilder {
                &mut self.percentiles
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_percentiles_aggregate(&mut codec);
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

percentiles_aggregate!(
    /// Result of a `percentiles` aggregation using the t-digest method (the default).
    TDigestPercentilesAggregate,
    TDigestPercentilesAggregateBuilder,
    TDIGEST_PERCENTILES_AGGREGATE_CODEC
);
percentiles_aggregate!(
    /// Result of a `percentiles` aggregation using the HDR histogram method.
    HdrPercentilesAggregate,
    HdrPercentilesAggregateBuilder,
    HDR_PERCENTILES_AGGREGATE_CODEC
);

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_string, encode_value};
    use crate::error::ErrorKind;
    use crate::model::JsonData;

    #[test]
    fn test_null_value_decodes_to_zero() {
        let avg: AvgAggregate = decode_value(&json!({"value": null})).unwrap();
        assert_eq!(avg.value(), 0.0);
        assert_eq!(avg.value_as_string(), None);
    }

    #[test]
    fn test_zero_value_encodes_as_integer() {
        let avg = AvgAggregate::builder().value(0.0).build().unwrap();
        assert_eq!(encode_string(&avg).unwrap(), r#"{"value":0}"#);
    }

    #[test]
    fn test_missing_value() {
        let err = AvgAggregate::builder().value_as_string("n/a").build().unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingRequiredField {
                type_name: "AvgAggregate",
                field: "value"
            }
        );
        let err = decode_value::<SumAggregate>(&json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    }

    #[test]
    fn test_string_value_must_be_finite() {
        let avg: AvgAggregate = decode_value(&json!({"value": "12.5"})).unwrap();
        assert_eq!(encode_value(&avg).unwrap(), json!({"value": 12.5}));

        let err = decode_value::<AvgAggregate>(&json!({"value": "NaN"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.path(), Some("$.value"));
    }

    #[test]
    fn test_builder_single_use() {
        let mut builder = MaxAggregate::builder();
        builder.value(3.0).meta_entry("owner", JsonData::new(json!("ops")));
        let max = builder.build().unwrap();
        assert_eq!(max.meta()["owner"].as_value(), &json!("ops"));
        assert_eq!(
            builder.build(),
            Err(BuildError::AlreadyBuilt { type_name: "MaxAggregate" })
        );
    }

    #[test]
    fn test_unknown_field() {
        let err = decode_value::<AvgAggregate>(&json!({"value": 1, "valu": 2})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }

    #[test]
    fn test_stats_empty_set() {
        let input = json!({"count": 0, "min": null, "max": null, "avg": null, "sum": 0.0});
        let stats: StatsAggregate = decode_value(&input).unwrap();
        assert_eq!((stats.count(), stats.min(), stats.max(), stats.avg()), (0, 0.0, 0.0, 0.0));
        assert_eq!(
            encode_value(&stats).unwrap(),
            json!({"count": 0, "min": 0, "max": 0, "avg": 0, "sum": 0})
        );
    }

    #[test]
    fn test_derivative_normalized_value() {
        let input = json!({"value": 10.5, "normalized_value": 0.25, "value_as_string": "10.5"});
        let derivative: DerivativeAggregate = decode_value(&input).unwrap();
        assert_eq!(derivative.value(), 10.5);
        assert_eq!(derivative.normalized_value(), Some(0.25));
        let again: DerivativeAggregate = decode_value(&encode_value(&derivative).unwrap()).unwrap();
        assert_eq!(again, derivative);
    }

    #[test]
    fn test_percentiles_values_required() {
        let err = decode_value::<TDigestPercentilesAggregate>(&json!({"meta": {}})).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Build {
                source: BuildError::MissingRequiredField { field: "values", .. },
                ..
            }
        ));
    }
}
