//! Metric aggregation requests.

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, ObjectCodec, Reader, Writer};
use crate::error::{BuildError, DecodeError, EncodeError};
use crate::model::builder::SingleUse;
use crate::model::FieldValue;

// =============================================================================
// BASE
// =============================================================================

/// Source field, substitute for documents missing it, and output format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricAggregationBase {
    pub(crate) field: Option<String>,
    pub(crate) missing: Option<FieldValue>,
    pub(crate) format: Option<String>,
}

pub trait MetricAggregationFields {
    fn metric_base(&self) -> &MetricAggregationBase;

    fn field(&self) -> Option<&str> {
        self.metric_base().field.as_deref()
    }

    /// Value used for documents without `field`.
    fn missing(&self) -> Option<&FieldValue> {
        self.metric_base().missing.as_ref()
    }

    fn format(&self) -> Option<&str> {
        self.metric_base().format.as_deref()
    }
}

pub trait MetricAggregationSetters {
    fn metric_base_mut(&mut self) -> &mut MetricAggregationBase;

    fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.metric_base_mut().field = Some(field.into());
        self
    }

    fn missing(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        self.metric_base_mut().missing = Some(value.into());
        self
    }

    fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.metric_base_mut().format = Some(format.into());
        self
    }
}

pub(crate) fn setup_metric_aggregation<T, B>(codec: &mut ObjectCodec<T, B>)
where
    T: MetricAggregationFields,
    B: MetricAggregationSetters,
{
    codec
        .add(
            "field",
            |b, r| {
                b.field(r.read_string()?);
                Ok(())
            },
            |v, w| w.write_optional_field("field", v.field()),
        )
        .add(
            "missing",
            |b, r| {
                b.missing(FieldValue::decode(r)?);
                Ok(())
            },
            |v, w| w.write_optional_field("missing", v.missing()),
        )
        .add(
            "format",
            |b, r| {
                b.format(r.read_string()?);
                Ok(())
            },
            |v, w| w.write_optional_field("format", v.format()),
        );
}

macro_rules! metric_aggregation {
    ($(#[$doc:meta])* $name:ident, $builder:ident, $codec:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            base: MetricAggregationBase,
        }

        impl $name {
            pub fn builder() -> $builder {
                $builder::new()
            }

            /// Shorthand for an aggregation over `field`.
            pub fn of_field(field: impl Into<String>) -> Self {
                Self {
                    base: MetricAggregationBase {
                        field: Some(field.into()),
                        ..Default::default()
                    },
                }
            }
        }

        impl MetricAggregationFields for $name {
            fn metric_base(&self) -> &MetricAggregationBase {
                &self.base
            }
        }

        #[doc = concat!("Builder for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            guard: SingleUse,
            base: MetricAggregationBase,
        }

        impl $builder {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(&mut self) -> Result<$name, BuildError> {
                self.guard.consume(stringify!($name))?;
                Ok($name {
                    base: std::mem::take(&mut self.base),
                })
            }
        }

        impl MetricAggregationSetters for $builder {
            fn metric_base_mut(&mut self) -> &mut MetricAggregationBase {
                &mut self.base
            }
        }

        lazy_static! {
            static ref $codec: ObjectCodec<$name, $builder> = {
                let mut codec = ObjectCodec::new(stringify!($name), $builder::new, $builder::build);
                setup_metric_aggregation(&mut codec);
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

metric_aggregation!(
    /// Request for the mean of a numeric field.
    AvgAggregation,
    AvgAggregationBuilder,
    AVG_AGGREGATION_CODEC
);
metric_aggregation!(SumAggregation, SumAggregationBuilder, SUM_AGGREGATION_CODEC);
metric_aggregation!(MinAggregation, MinAggregationBuilder, MIN_AGGREGATION_CODEC);
metric_aggregation!(MaxAggregation, MaxAggregationBuilder, MAX_AGGREGATION_CODEC);
metric_aggregation!(
    /// Request for the number of values of a field.
    ValueCountAggregation,
    ValueCountAggregationBuilder,
    VALUE_COUNT_AGGREGATION_CODEC
);
metric_aggregation!(
    /// Request for count, min, max, avg and sum in one pass.
    StatsAggregation,
    StatsAggregationBuilder,
    STATS_AGGREGATION_CODEC
);

// =============================================================================
// CARDINALITY
// =============================================================================

/// Request for an approximate distinct count.
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalityAggregation {
    base: MetricAggregationBase,
    precision_threshold: Option<i32>,
}

impl CardinalityAggregation {
    pub fn builder() -> CardinalityAggregationBuilder {
        CardinalityAggregationBuilder::new()
    }

    /// Counts below this are expected to be close to exact.
    pub fn precision_threshold(&self) -> Option<i32> {
        self.precision_threshold
    }
}

impl MetricAggregationFields for CardinalityAggregation {
    fn metric_base(&self) -> &MetricAggregationBase {
        &self.base
    }
}

/// Builder for [`CardinalityAggregation`].
#[derive(Debug, Clone, Default)]
pub struct CardinalityAggregationBuilder {
    guard: SingleUse,
    base: MetricAggregationBase,
    precision_threshold: Option<i32>,
}

impl CardinalityAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn precision_threshold(&mut self, value: i32) -> &mut Self {
        self.precision_threshold = Some(value);
        self
    }

    pub fn build(&mut self) -> Result<CardinalityAggregation, BuildError> {
        self.guard.consume("CardinalityAggregation")?;
        Ok(CardinalityAggregation {
            base: std::mem::take(&mut self.base),
            precision_threshold: self.precision_threshold.take(),
        })
    }
}

impl MetricAggregationSetters for CardinalityAggregationBuilder {
    fn metric_base_mut(&mut self) -> &mut MetricAggregationBase {
        &mut self.base
    }
}

lazy_static! {
    static ref CARDINALITY_AGGREGATION_CODEC: ObjectCodec<CardinalityAggregation, CardinalityAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "CardinalityAggregation",
            CardinalityAggregationBuilder::new,
            CardinalityAggregationBuilder::build,
        );
        setup_metric_aggregation(&mut codec);
        codec.add(
            "precision_threshold",
            |b, r| {
                b.precision_threshold(r.read_i32()?);
                Ok(())
            },
            |v, w| w.write_optional_field("precision_threshold", v.precision_threshold.as_ref()),
        );
        codec
    };
}

impl Encode for CardinalityAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        CARDINALITY_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for CardinalityAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        CARDINALITY_AGGREGATION_CODEC.decode(reader)
    }
}

// =============================================================================
// PERCENTILES
// =============================================================================

/// Request for percentiles of a numeric field.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentilesAggregation {
    base: MetricAggregationBase,
    keyed: Option<bool>,
    percents: Vec<f64>,
}

impl PercentilesAggregation {
    pub fn builder() -> PercentilesAggregationBuilder {
        PercentilesAggregationBuilder::new()
    }

    /// Whether results come back as an object keyed by percent.
    pub fn keyed(&self) -> Option<bool> {
        self.keyed
    }

    /// Requested percents; the server default applies when empty.
    pub fn percents(&self) -> &[f64] {
        &self.percents
    }
}

impl MetricAggregationFields for PercentilesAggregation {
    fn metric_base(&self) -> &MetricAggregationBase {
        &self.base
    }
}

/// Builder for [`PercentilesAggregation`].
#[derive(Debug, Clone, Default)]
pub struct PercentilesAggregationBuilder {
    guard: SingleUse,
    base: MetricAggregationBase,
    keyed: Option<bool>,
    percents: Vec<f64>,
}

impl PercentilesAggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyed(&mut self, value: bool) -> &mut Self {
        self.keyed = Some(value);
        self
    }

    /// Replaces `percents`.
    pub fn percents(&mut self, percents: Vec<f64>) -> &mut Self {
        self.percents = percents;
        self
    }

    /// Appends one percent.
    pub fn add_percent(&mut self, percent: f64) -> &mut Self {
        self.percents.push(percent);
        self
    }

    /// Appends several percents.
    pub fn extend_percents(&mut self, percents: impl IntoIterator<Item = f64>) -> &mut Self {
        self.percents.extend(percents);
        self
    }

    pub fn build(&mut self) -> Result<PercentilesAggregation, BuildError> {
        self.guard.consume("PercentilesAggregation")?;
        Ok(PercentilesAggregation {
            base: std::mem::take(&mut self.base),
            keyed: self.keyed.take(),
            percents: std::mem::take(&mut self.percents),
        })
    }
}

impl MetricAggregationSetters for PercentilesAggregationBuilder {
    fn metric_base_mut(&mut self) -> &mut MetricAggregationBase {
        &mut self.base
    }
}

lazy_static! {
    static ref PERCENTILES_AGGREGATION_CODEC: ObjectCodec<PercentilesAggregation, PercentilesAggregationBuilder> = {
        let mut codec = ObjectCodec::new(
            "PercentilesAggregation",
            PercentilesAggregationBuilder::new,
            PercentilesAggregationBuilder::build,
        );
        setup_metric_aggregation(&mut codec);
        codec
            .add(
                "keyed",
                |b, r| {
                    b.keyed(r.read_bool()?);
                    Ok(())
                },
                |v, w| w.write_optional_field("keyed", v.keyed.as_ref()),
            )
            .add(
                "percents",
                |b, r| {
                    b.extend_percents(r.read_single_or_vec(|r| r.read_f64())?);
                    Ok(())
                },
                |v, w| w.write_slice_field("percents", &v.percents),
            );
        codec
    };
}

impl Encode for PercentilesAggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        PERCENTILES_AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for PercentilesAggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        PERCENTILES_AGGREGATION_CODEC.decode(reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};

    #[test]
    fn test_metric_fields_round_trip() {
        let avg = AvgAggregation::builder()
            .field("price")
            .missing(0i64)
            .format("0.00")
            .build()
            .unwrap();
        let value = encode_value(&avg).unwrap();
        assert_eq!(value, json!({"field": "price", "missing": 0, "format": "0.00"}));
        assert_eq!(decode_value::<AvgAggregation>(&value).unwrap(), avg);
    }

    #[test]
    fn test_all_optional_fields_absent() {
        let stats = StatsAggregation::builder().build().unwrap();
        let value = encode_value(&stats).unwrap();
        assert_eq!(value, json!({}));
        assert_eq!(decode_value::<StatsAggregation>(&value).unwrap(), stats);
    }

    #[test]
    fn test_percents_accept_single_value() {
        let percentiles: PercentilesAggregation = decode_value(&json!({"field": "latency", "percents": 99})).unwrap();
        assert_eq!(percentiles.percents(), &[99.0]);
        assert_eq!(
            encode_value(&percentiles).unwrap(),
            json!({"field": "latency", "percents": [99]})
        );
    }

    #[test]
    fn test_percents_mutators() {
        let percentiles = PercentilesAggregation::builder()
            .percents(vec![50.0])
            .add_percent(95.0)
            .extend_percents([99.0, 99.9])
            .build()
            .unwrap();
        assert_eq!(percentiles.percents(), &[50.0, 95.0, 99.0, 99.9]);
    }

    #[test]
    fn test_cardinality_precision() {
        let value = json!({"field": "user", "precision_threshold": 1000});
        let cardinality: CardinalityAggregation = decode_value(&value).unwrap();
        assert_eq!(cardinality.precision_threshold(), Some(1000));
        assert_eq!(cardinality.field(), Some("user"));
        assert_eq!(encode_value(&cardinality).unwrap(), value);
    }
}
