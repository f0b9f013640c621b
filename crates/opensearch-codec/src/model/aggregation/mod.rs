//! Aggregation requests.
//!
//! A request is externally tagged: the body of the active kind sits under
//! its kind name, next to the optional `aggregations` and `meta` members.
//!
//! ```json
//! {
//!   "terms": { "field": "tags", "size": 5 },
//!   "aggregations": { "avg_price": { "avg": { "field": "price" } } }
//! }
//! ```

mod bucket;
mod metric;

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::codec::{Decode, Encode, JsonEnum, ObjectCodec, Reader, TaggedUnion, Writer};
use crate::error::{BuildError, DecodeError, EncodeError, VariantMismatch};
use crate::model::builder::{SingleUse, require};
use crate::model::JsonData;

pub use bucket::{
    AggregationRange, AggregationRangeBuilder, DateHistogramAggregation, DateHistogramAggregationBuilder,
    FiltersAggregation, FiltersAggregationBuilder, GlobalAggregation, GlobalAggregationBuilder,
    HistogramAggregation, HistogramAggregationBuilder, MissingAggregation, MissingAggregationBuilder,
    RangeAggregation, RangeAggregationBuilder, TermsAggregation, TermsAggregationBuilder,
};
pub use metric::{
    AvgAggregation, AvgAggregationBuilder, CardinalityAggregation, CardinalityAggregationBuilder, MaxAggregation,
    MaxAggregationBuilder, MetricAggregationBase, MetricAggregationFields, MetricAggregationSetters, MinAggregation,
    MinAggregationBuilder, PercentilesAggregation, PercentilesAggregationBuilder, StatsAggregation,
    StatsAggregationBuilder, SumAggregation, SumAggregationBuilder, ValueCountAggregation,
    ValueCountAggregationBuilder,
};

/// Reported as the missing field when a request names no kind.
const VARIANT_FIELD: &str = "<variant kind>";

/// Declares the request family: the variant enum, its kind enum, the
/// per-kind accessors and builder setters, and the per-kind table bindings.
macro_rules! aggregation_family {
    ($($variant:ident($ty:ty) => $kind:literal, $is:ident, $get:ident;)*) => {
        /// The active kind of a request and its body.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AggregationVariant {
            $($variant($ty),)*
        }

        /// Kind of an aggregation request, as written on the wire.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum AggregationKind {
            $($variant,)*
        }

        impl JsonEnum for AggregationKind {
            const NAME: &'static str = "AggregationKind";
            const VARIANTS: &'static [Self] = &[$(AggregationKind::$variant,)*];

            fn json_value(&self) -> &'static str {
                match self {
                    $(AggregationKind::$variant => $kind,)*
                }
            }
        }

        impl AggregationVariant {
            pub fn kind(&self) -> AggregationKind {
                match self {
                    $(AggregationVariant::$variant(_) => AggregationKind::$variant,)*
                }
            }
        }

        $(
            impl From<$ty> for AggregationVariant {
                fn from(value: $ty) -> Self {
                    AggregationVariant::$variant(value)
                }
            }

            impl From<$ty> for Aggregation {
                fn from(value: $ty) -> Self {
                    Aggregation::new(value)
                }
            }
        )*

        impl Aggregation {
            $(
                pub fn $is(&self) -> bool {
                    matches!(self.variant, AggregationVariant::$variant(_))
                }

                pub fn $get(&self) -> Result<&$ty, VariantMismatch> {
                    match &self.variant {
                        AggregationVariant::$variant(value) => Ok(value),
                        _ => Err(self.mismatch($kind)),
                    }
                }
            )*
        }

        impl AggregationBuilder {
            $(
                #[doc = concat!("Sets the `", $kind, "` body, replacing any kind set before.")]
                pub fn $get(&mut self, value: $ty) -> &mut Self {
                    self.variant(AggregationVariant::$variant(value))
                }
            )*
        }

        fn setup_variants(codec: &mut ObjectCodec<Aggregation, AggregationBuilder>) {
            $(
                codec.add(
                    $kind,
                    |b, r| {
                        b.check_no_variant($kind, r)?;
                        b.variant(AggregationVariant::$variant(<$ty as Decode>::decode(r)?));
                        Ok(())
                    },
                    |v, w| match &v.variant {
                        AggregationVariant::$variant(value) => w.write_field($kind, value),
                        _ => Ok(()),
                    },
                );
            )*
        }
    };
}

aggregation_family! {
    Avg(AvgAggregation) => "avg", is_avg, avg;
    Sum(SumAggregation) => "sum", is_sum, sum;
    Min(MinAggregation) => "min", is_min, min;
    Max(MaxAggregation) => "max", is_max, max;
    ValueCount(ValueCountAggregation) => "value_count", is_value_count, value_count;
    Stats(StatsAggregation) => "stats", is_stats, stats;
    Cardinality(CardinalityAggregation) => "cardinality", is_cardinality, cardinality;
    Percentiles(PercentilesAggregation) => "percentiles", is_percentiles, percentiles;
    Terms(TermsAggregation) => "terms", is_terms, terms;
    Histogram(HistogramAggregation) => "histogram", is_histogram, histogram;
    DateHistogram(DateHistogramAggregation) => "date_histogram", is_date_histogram, date_histogram;
    Range(RangeAggregation) => "range", is_range, range;
    Filters(FiltersAggregation) => "filters", is_filters, filters;
    Filter(JsonData) => "filter", is_filter, filter;
    Global(GlobalAggregation) => "global", is_global, global;
    Missing(MissingAggregation) => "missing", is_missing, missing;
}

impl AggregationKind {
    /// Returns true for kinds that compute values rather than buckets.
    pub fn is_metric(&self) -> bool {
        matches!(
            self,
            AggregationKind::Avg
                | AggregationKind::Sum
                | AggregationKind::Min
                | AggregationKind::Max
                | AggregationKind::ValueCount
                | AggregationKind::Stats
                | AggregationKind::Cardinality
                | AggregationKind::Percentiles
        )
    }
}

/// One aggregation request with its sub-aggregations.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    variant: AggregationVariant,
    aggregations: BTreeMap<String, Aggregation>,
    meta: BTreeMap<String, JsonData>,
}

impl Aggregation {
    /// Creates a request with no sub-aggregations and no metadata.
    pub fn new(variant: impl Into<AggregationVariant>) -> Self {
        Self {
            variant: variant.into(),
            aggregations: BTreeMap::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn builder() -> AggregationBuilder {
        AggregationBuilder::new()
    }

    pub fn kind(&self) -> AggregationKind {
        self.variant.kind()
    }

    pub fn variant(&self) -> &AggregationVariant {
        &self.variant
    }

    pub fn into_variant(self) -> AggregationVariant {
        self.variant
    }

    /// Sub-aggregations, computed per bucket of this one.
    pub fn aggregations(&self) -> &BTreeMap<String, Aggregation> {
        &self.aggregations
    }

    pub fn aggregation(&self, name: &str) -> Option<&Aggregation> {
        self.aggregations.get(name)
    }

    pub fn meta(&self) -> &BTreeMap<String, JsonData> {
        &self.meta
    }
}

impl TaggedUnion for Aggregation {
    const UNION_NAME: &'static str = "Aggregation";

    fn variant_tag(&self) -> &'static str {
        self.kind().json_value()
    }
}

/// Builder for [`Aggregation`].
///
/// Exactly one kind must be set before `build()`. Setting a second kind
/// replaces the first; decoding a second kind key is an error.
#[derive(Debug, Clone, Default)]
pub struct AggregationBuilder {
    guard: SingleUse,
    variant: Option<AggregationVariant>,
    aggregations: BTreeMap<String, Aggregation>,
    meta: BTreeMap<String, JsonData>,
}

impl AggregationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(&mut self, variant: impl Into<AggregationVariant>) -> &mut Self {
        self.variant = Some(variant.into());
        self
    }

    /// Replaces the sub-aggregations.
    pub fn aggregations(&mut self, aggregations: BTreeMap<String, Aggregation>) -> &mut Self {
        self.aggregations = aggregations;
        self
    }

    /// Puts one sub-aggregation.
    pub fn aggregation(&mut self, name: impl Into<String>, aggregation: impl Into<Aggregation>) -> &mut Self {
        self.aggregations.insert(name.into(), aggregation.into());
        self
    }

    pub fn extend_aggregations(&mut self, entries: impl IntoIterator<Item = (String, Aggregation)>) -> &mut Self {
        self.aggregations.extend(entries);
        self
    }

    /// Replaces `meta`.
    pub fn meta(&mut self, meta: BTreeMap<String, JsonData>) -> &mut Self {
        self.meta = meta;
        self
    }

    pub fn meta_entry(&mut self, key: impl Into<String>, value: impl Into<JsonData>) -> &mut Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn extend_meta(&mut self, entries: impl IntoIterator<Item = (String, JsonData)>) -> &mut Self {
        self.meta.extend(entries);
        self
    }

    pub fn build(&mut self) -> Result<Aggregation, BuildError> {
        self.guard.consume("Aggregation")?;
        Ok(Aggregation {
            variant: require(self.variant.take(), "Aggregation", VARIANT_FIELD)?,
            aggregations: std::mem::take(&mut self.aggregations),
            meta: std::mem::take(&mut self.meta),
        })
    }

    fn check_no_variant(&self, kind: &str, reader: &Reader<'_>) -> Result<(), DecodeError> {
        match &self.variant {
            Some(first) => Err(DecodeError::MultipleVariants {
                union: "Aggregation",
                first: first.kind().json_value(),
                second: kind.to_string(),
                path: reader.path(),
            }),
            None => Ok(()),
        }
    }
}

lazy_static! {
    static ref AGGREGATION_CODEC: ObjectCodec<Aggregation, AggregationBuilder> = {
        let mut codec = ObjectCodec::new("Aggregation", AggregationBuilder::new, AggregationBuilder::build);
        codec
            .add_with_aliases(
                "aggregations",
                &["aggs"],
                |b, r| {
                    b.extend_aggregations(r.read_string_map(Aggregation::decode)?);
                    Ok(())
                },
                |v, w| w.write_map_field("aggregations", &v.aggregations),
            )
            .add(
                "meta",
                |b, r| {
                    b.meta(r.read_string_map(JsonData::decode)?);
                    Ok(())
                },
                |v, w| w.write_map_field("meta", &v.meta),
            );
        setup_variants(&mut codec);
        codec
    };
}

impl Encode for Aggregation {
    fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        AGGREGATION_CODEC.encode(self, writer)
    }
}

impl Decode for Aggregation {
    fn decode(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        AGGREGATION_CODEC.decode(reader)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::{decode_value, encode_value};
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_with_sub_aggregations() {
        let input = json!({
            "terms": {"field": "tags", "size": 5},
            "aggs": {"avg_price": {"avg": {"field": "price"}}},
            "meta": {"owner": "search"}
        });
        let aggregation: Aggregation = decode_value(&input).unwrap();
        assert_eq!(aggregation.kind(), AggregationKind::Terms);
        assert_eq!(aggregation.terms().unwrap().size(), Some(5));

        let avg = aggregation.aggregation("avg_price").unwrap();
        assert_eq!(avg.avg().unwrap().field(), Some("price"));
        assert_eq!(aggregation.meta()["owner"].as_value(), &json!("search"));

        // The alias is written under its primary name.
        assert_eq!(
            encode_value(&aggregation).unwrap(),
            json!({
                "aggregations": {"avg_price": {"avg": {"field": "price"}}},
                "meta": {"owner": "search"},
                "terms": {"field": "tags", "size": 5}
            })
        );
    }

    #[test]
    fn test_missing_kind() {
        let err = decode_value::<Aggregation>(&json!({"meta": {}})).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Build {
                source: BuildError::MissingRequiredField {
                    type_name: "Aggregation",
                    field: VARIANT_FIELD,
                },
                ..
            }
        ));
    }

    #[test]
    fn test_two_kinds() {
        let err = decode_value::<Aggregation>(&json!({
            "avg": {"field": "price"},
            "sum": {"field": "price"}
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        match err {
            DecodeError::MultipleVariants { first, second, path, .. } => {
                assert_eq!((first, second.as_str()), ("avg", "sum"));
                assert_eq!(path, "$.sum");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builder_last_kind_wins() {
        let aggregation = Aggregation::builder()
            .avg(AvgAggregation::of_field("price"))
            .max(MaxAggregation::of_field("price"))
            .build()
            .unwrap();
        assert!(aggregation.is_max());

        let err = aggregation.avg().unwrap_err();
        assert_eq!((err.union, err.requested, err.actual), ("Aggregation", "avg", "max"));
    }

    #[test]
    fn test_builder_single_use() {
        let mut builder = Aggregation::builder();
        builder.global(GlobalAggregation::new());
        assert!(builder.build().is_ok());
        assert_eq!(
            builder.build(),
            Err(BuildError::AlreadyBuilt { type_name: "Aggregation" })
        );

        let err = Aggregation::builder().build().unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingRequiredField {
                type_name: "Aggregation",
                field: VARIANT_FIELD,
            }
        );
    }

    #[test]
    fn test_filter_holds_raw_query() {
        let input = json!({"filter": {"term": {"status": "active"}}});
        let aggregation: Aggregation = decode_value(&input).unwrap();
        assert_eq!(aggregation.filter().unwrap().as_value(), &json!({"term": {"status": "active"}}));
        assert_eq!(encode_value(&aggregation).unwrap(), input);
    }

    #[test]
    fn test_unknown_kind_is_unknown_field() {
        let err = decode_value::<Aggregation>(&json!({"bogus_kind": {}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownField);
    }
}
