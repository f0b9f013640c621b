//! Semantic validation for aggregation requests.
//!
//! Decoding only checks structure. These checks catch requests the server
//! would reject (bad names, sub-aggregations under metrics, out-of-range
//! parameters) before they are sent.

use std::collections::BTreeMap;

use crate::codec::JsonEnum;
use crate::error::ValidationError;
use crate::model::aggregation::{Aggregation, AggregationVariant, MetricAggregationFields};

/// Characters the server reserves for aggregation paths.
const RESERVED_NAME_CHARS: [char; 3] = ['[', ']', '>'];

/// Validates every named request in a map, recursing into sub-aggregations.
pub fn validate_aggregations(aggregations: &BTreeMap<String, Aggregation>) -> Result<(), ValidationError> {
    for (name, aggregation) in aggregations {
        validate_aggregation(name, aggregation)?;
    }
    Ok(())
}

/// Validates one named request and its sub-aggregations.
pub fn validate_aggregation(name: &str, aggregation: &Aggregation) -> Result<(), ValidationError> {
    validate_name(name)?;

    let kind = aggregation.kind();
    if kind.is_metric() && !aggregation.aggregations().is_empty() {
        return Err(ValidationError::SubAggregationsNotAllowed {
            name: name.to_string(),
            kind: kind.json_value(),
        });
    }

    validate_variant(name, aggregation.variant())?;
    validate_aggregations(aggregation.aggregations())
}

/// Checks that a name is usable in a buckets path.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.contains(RESERVED_NAME_CHARS) {
        return Err(ValidationError::InvalidName { name: name.to_string() });
    }
    Ok(())
}

fn validate_variant(name: &str, variant: &AggregationVariant) -> Result<(), ValidationError> {
    let kind = variant.kind().json_value();
    let missing = |field: &'static str| ValidationError::MissingParameter {
        name: name.to_string(),
        kind,
        field,
    };
    let invalid = |field: &'static str, reason: &'static str| ValidationError::InvalidParameter {
        name: name.to_string(),
        field,
        reason,
    };

    match variant {
        AggregationVariant::Avg(v) => require_field(v.field(), missing),
        AggregationVariant::Sum(v) => require_field(v.field(), missing),
        AggregationVariant::Min(v) => require_field(v.field(), missing),
        AggregationVariant::Max(v) => require_field(v.field(), missing),
        AggregationVariant::ValueCount(v) => require_field(v.field(), missing),
        AggregationVariant::Stats(v) => require_field(v.field(), missing),
        AggregationVariant::Cardinality(v) => {
            require_field(v.field(), missing)?;
            match v.precision_threshold() {
                Some(threshold) if threshold < 0 => Err(invalid("precision_threshold", "must not be negative")),
                _ => Ok(()),
            }
        }
        AggregationVariant::Percentiles(v) => {
            require_field(v.field(), missing)?;
            if v.percents().iter().any(|p| !(0.0..=100.0).contains(p)) {
                return Err(invalid("percents", "must be within [0, 100]"));
            }
            Ok(())
        }
        AggregationVariant::Terms(v) => {
            require_field(v.field(), missing)?;
            match v.size() {
                Some(size) if size <= 0 => Err(invalid("size", "must be greater than 0")),
                _ => Ok(()),
            }
        }
        AggregationVariant::Histogram(v) => {
            require_field(v.field(), missing)?;
            match v.interval() {
                None => Err(missing("interval")),
                Some(interval) if interval.is_nan() || interval <= 0.0 => {
                    Err(invalid("interval", "must be greater than 0"))
                }
                Some(_) => Ok(()),
            }
        }
        AggregationVariant::DateHistogram(v) => {
            require_field(v.field(), missing)?;
            if v.calendar_interval().is_none() && v.fixed_interval().is_none() {
                return Err(missing("calendar_interval"));
            }
            Ok(())
        }
        AggregationVariant::Range(v) => {
            require_field(v.field(), missing)?;
            if v.ranges().is_empty() {
                return Err(invalid("ranges", "must define at least one range"));
            }
            Ok(())
        }
        AggregationVariant::Filters(v) => match v.filters() {
            Some(_) => Ok(()),
            None => Err(missing("filters")),
        },
        AggregationVariant::Missing(v) => require_field(v.field(), missing),
        AggregationVariant::Filter(_) | AggregationVariant::Global(_) => Ok(()),
    }
}

fn require_field<F>(field: Option<&str>, missing: F) -> Result<(), ValidationError>
where
    F: Fn(&'static str) -> ValidationError,
{
    match field {
        Some(field) if !field.is_empty() => Ok(()),
        _ => Err(missing("field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::aggregation::{
        AggregationRange, AvgAggregation, DateHistogramAggregation, GlobalAggregation, HistogramAggregation,
        PercentilesAggregation, RangeAggregation, TermsAggregation,
    };
    use crate::prelude::*;

    fn avg_price() -> Aggregation {
        Aggregation::new(AvgAggregation::of_field("price"))
    }

    #[test]
    fn test_valid_tree() {
        let terms = Aggregation::builder()
            .terms(TermsAggregation::builder().field("tags").size(10).build().unwrap())
            .aggregation("avg_price", avg_price())
            .build()
            .unwrap();
        let mut aggregations = BTreeMap::new();
        aggregations.insert("by_tag".to_string(), terms);
        assert_eq!(validate_aggregations(&aggregations), Ok(()));
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "a>b", "a[0]"] {
            let err = validate_aggregation(name, &avg_price()).unwrap_err();
            assert_eq!(err, ValidationError::InvalidName { name: name.to_string() });
            assert_eq!(err.kind(), ErrorKind::Invalid);
        }
    }

    #[test]
    fn test_metric_with_sub_aggregations() {
        let aggregation = Aggregation::builder()
            .avg(AvgAggregation::of_field("price"))
            .aggregation("nested", avg_price())
            .build()
            .unwrap();
        assert_eq!(
            validate_aggregation("avg_price", &aggregation),
            Err(ValidationError::SubAggregationsNotAllowed {
                name: "avg_price".to_string(),
                kind: "avg",
            })
        );
    }

    #[test]
    fn test_missing_field() {
        let aggregation = Aggregation::new(AvgAggregation::builder().format("0.0").build().unwrap());
        assert_eq!(
            validate_aggregation("avg_price", &aggregation),
            Err(ValidationError::MissingParameter {
                name: "avg_price".to_string(),
                kind: "avg",
                field: "field",
            })
        );
    }

    #[test]
    fn test_parameter_ranges() {
        let percentiles = PercentilesAggregation::builder().field("latency").add_percent(101.0).build().unwrap();
        assert!(matches!(
            validate_aggregation("p", &Aggregation::new(percentiles)),
            Err(ValidationError::InvalidParameter { field: "percents", .. })
        ));

        let histogram = HistogramAggregation::builder().field("price").interval(0.0).build().unwrap();
        assert!(matches!(
            validate_aggregation("h", &Aggregation::new(histogram)),
            Err(ValidationError::InvalidParameter { field: "interval", .. })
        ));

        let terms = TermsAggregation::builder().field("tags").size(0).build().unwrap();
        assert!(matches!(
            validate_aggregation("t", &Aggregation::new(terms)),
            Err(ValidationError::InvalidParameter { field: "size", .. })
        ));

        let range = RangeAggregation::builder().field("price").build().unwrap();
        assert!(matches!(
            validate_aggregation("r", &Aggregation::new(range)),
            Err(ValidationError::InvalidParameter { field: "ranges", .. })
        ));

        let range = RangeAggregation::builder()
            .field("price")
            .add_range(AggregationRange::new(None, Some(100.0)))
            .build()
            .unwrap();
        assert_eq!(validate_aggregation("r", &Aggregation::new(range)), Ok(()));
    }

    #[test]
    fn test_date_histogram_needs_interval() {
        let histogram = DateHistogramAggregation::builder().field("ts").build().unwrap();
        assert!(matches!(
            validate_aggregation("d", &Aggregation::new(histogram)),
            Err(ValidationError::MissingParameter { field: "calendar_interval", .. })
        ));
    }

    #[test]
    fn test_errors_in_sub_aggregations() {
        let global = Aggregation::builder()
            .global(GlobalAggregation::new())
            .aggregation("bad>name", avg_price())
            .build()
            .unwrap();
        assert!(matches!(
            validate_aggregation("all", &global),
            Err(ValidationError::InvalidName { .. })
        ));
    }
}
