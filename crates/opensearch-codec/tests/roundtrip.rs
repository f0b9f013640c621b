use std::collections::BTreeMap;

use opensearch_codec::codec::{Reader, decode_str, decode_value, encode_string, encode_value};
use opensearch_codec::error::{BuildError, DecodeError, ErrorKind};
use opensearch_codec::model::aggregate::{AvgAggregate, StatsAggregate, StringTermsAggregate, StringTermsBucket};
use opensearch_codec::model::aggregation::{AvgAggregation, TermsAggregation};
use opensearch_codec::prelude::*;
use opensearch_codec::{Aggregate, Aggregation, JsonData, decode_aggregations, encode_aggregations};
use proptest::prelude::*;
use serde_json::json;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

// Quarter steps print and parse back exactly.
fn metric_value() -> impl Strategy<Value = f64> {
    (-4_000_000i64..4_000_000).prop_map(|v| v as f64 / 4.0)
}

fn avg_aggregate() -> impl Strategy<Value = AvgAggregate> {
    (
        metric_value(),
        proptest::option::of("[0-9.,]{1,8}"),
        proptest::option::of(name()),
    )
        .prop_map(|(value, value_as_string, owner)| {
            let mut builder = AvgAggregate::builder();
            builder.value(value);
            if let Some(text) = value_as_string {
                builder.value_as_string(text);
            }
            if let Some(owner) = owner {
                builder.meta_entry("owner", JsonData::new(json!(owner)));
            }
            builder.build().unwrap()
        })
}

fn string_terms_bucket() -> impl Strategy<Value = StringTermsBucket> {
    (name(), 0i64..10_000, avg_aggregate()).prop_map(|(key, doc_count, avg)| {
        StringTermsBucket::builder()
            .key(key)
            .doc_count(doc_count)
            .aggregation("avg_price", avg)
            .build()
            .unwrap()
    })
}

fn string_terms_aggregate() -> impl Strategy<Value = StringTermsAggregate> {
    (
        proptest::collection::vec(string_terms_bucket(), 0..8),
        0i64..1_000,
        proptest::option::of(0i64..100),
    )
        .prop_map(|(buckets, sum_other, error_bound)| {
            let mut builder = StringTermsAggregate::builder();
            builder.buckets(buckets).sum_other_doc_count(sum_other);
            if let Some(bound) = error_bound {
                builder.doc_count_error_upper_bound(bound);
            }
            builder.build().unwrap()
        })
}

fn terms_request() -> impl Strategy<Value = Aggregation> {
    (name(), proptest::option::of(1i32..500), proptest::collection::btree_map(name(), name(), 0..4)).prop_map(
        |(field, size, subs)| {
            let mut terms = TermsAggregation::builder();
            terms.field(field);
            if let Some(size) = size {
                terms.size(size);
            }
            let mut builder = Aggregation::builder();
            builder.terms(terms.build().unwrap());
            for (sub_name, sub_field) in subs {
                builder.aggregation(sub_name, AvgAggregation::of_field(sub_field));
            }
            builder.build().unwrap()
        },
    )
}

proptest! {
    #[test]
    fn avg_round_trip(avg in avg_aggregate()) {
        let encoded = encode_value(&avg).unwrap();
        let decoded: AvgAggregate = decode_value(&encoded).unwrap();
        prop_assert_eq!(decoded, avg);
    }

    #[test]
    fn typed_keys_round_trip(terms in string_terms_aggregate(), avg in avg_aggregate()) {
        let mut aggregations = BTreeMap::new();
        aggregations.insert("by_tag".to_string(), Aggregate::from(terms));
        aggregations.insert("overall".to_string(), Aggregate::from(avg));

        let text = encode_aggregations(&aggregations).unwrap();
        let decoded = decode_aggregations(&text).unwrap();
        prop_assert_eq!(&decoded, &aggregations);
    }

    #[test]
    fn encode_is_a_fixpoint(terms in string_terms_aggregate()) {
        let first = encode_string(&terms).unwrap();
        let decoded: StringTermsAggregate = decode_str(&first).unwrap();
        let second = encode_string(&decoded).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn request_round_trip(request in terms_request()) {
        let encoded = encode_value(&request).unwrap();
        let decoded: Aggregation = decode_value(&encoded).unwrap();
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn missing_value_is_reported(kind in prop::sample::select(vec![
        "avg", "sum", "min", "max", "value_count", "weighted_avg", "median_absolute_deviation", "simple_value",
    ])) {
        let input = json!({"value_as_string": "1"});
        let err = Aggregate::decode_kind(kind, &mut Reader::new(&input)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        let is_value_missing = matches!(
            err,
            DecodeError::Build { source: BuildError::MissingRequiredField { field: "value", .. }, .. }
        );
        prop_assert!(is_value_missing);
    }
}

#[test]
fn all_optionals_absent() {
    let avg = AvgAggregate::builder().value(2.5).build().unwrap();
    assert_eq!(encode_value(&avg).unwrap(), json!({"value": 2.5}));
    assert_eq!(decode_value::<AvgAggregate>(&json!({"value": 2.5})).unwrap(), avg);
    assert_eq!(avg.value_as_string(), None);
    assert!(avg.meta().is_empty());
}

#[test]
fn builder_is_single_use() {
    let mut builder = StatsAggregate::builder();
    builder.count(1).min(1.0).max(1.0).avg(1.0).sum(1.0);
    assert!(builder.build().is_ok());
    assert_eq!(
        builder.build(),
        Err(BuildError::AlreadyBuilt {
            type_name: "StatsAggregate"
        })
    );
}

#[test]
fn bucket_with_untyped_sub_aggregation() {
    let input = json!({"key": "rust", "doc_count": 4, "avg": {"value": 3.5}});
    let bucket: StringTermsBucket = decode_value(&input).unwrap();
    assert_eq!(bucket.key(), "rust");
    assert_eq!(bucket.doc_count(), 4);
    assert_eq!(bucket.aggregation("avg").unwrap().avg().unwrap().value(), 3.5);

    // Written back with its kind.
    assert_eq!(
        encode_value(&bucket).unwrap(),
        json!({"doc_count": 4, "avg#avg": {"value": 3.5}, "key": "rust"})
    );
}

#[test]
fn unrecognized_kind() {
    let err = decode_aggregations(r#"{"bogus_kind#x": {"value": 1}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
    assert!(matches!(err, DecodeError::UnrecognizedKind { ref kind, .. } if kind == "bogus_kind"));
}

#[test]
fn nested_error_path() {
    let input = r#"{
        "sterms#by_tag": {
            "sum_other_doc_count": "many",
            "buckets": []
        }
    }"#;
    let err = decode_aggregations(input).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidNumber { .. }));
    assert_eq!(err.path(), Some("$.sterms#by_tag.sum_other_doc_count"));

    // Errors inside a bucket keep their category and path.
    let input = r#"{"sterms#by_tag": {"sum_other_doc_count": 0, "buckets": [{"key": "a"}]}}"#;
    let err = decode_aggregations(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(matches!(
        err,
        DecodeError::Build { source: BuildError::MissingRequiredField { field: "doc_count", .. }, .. }
    ));
    assert_eq!(err.path(), Some("$.sterms#by_tag.buckets[0]"));

    // Buckets given as a number fit neither shape.
    let input = r#"{"sterms#by_tag": {"sum_other_doc_count": 0, "buckets": 3}}"#;
    let err = decode_aggregations(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatchingVariant);
    assert_eq!(err.path(), Some("$.sterms#by_tag.buckets"));
}

#[test]
fn unrecognized_kind_inside_bucket() {
    let input = r#"{
        "sterms#by_tag": {
            "sum_other_doc_count": 0,
            "buckets": [{"key": "a", "doc_count": 1, "bogus_kind#x": {}}]
        }
    }"#;
    let err = decode_aggregations(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
    assert!(matches!(err, DecodeError::UnrecognizedKind { ref kind, .. } if kind == "bogus_kind"));

    // Keyed buckets dispatch the same way.
    let input = r#"{
        "date_histogram#per_month": {
            "buckets": {"2024-01": {"key": 1704067200000, "doc_count": 2, "nope#y": {"value": 1}}}
        }
    }"#;
    let err = decode_aggregations(input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnrecognizedKind);
}
