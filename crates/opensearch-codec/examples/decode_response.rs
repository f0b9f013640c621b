//! Simple decoder to inspect the aggregations of a search response.
//!
//! Accepts either a full search response or a bare `aggregations` object,
//! as returned with `typed_keys=true`.

use std::collections::BTreeMap;
use std::fs;

use opensearch_codec::codec::Reader;
use opensearch_codec::codec::typed_keys::read_aggregate_map;
use opensearch_codec::prelude::*;
use opensearch_codec::{Aggregate, Buckets, Percentiles};

fn format_metric(aggregate: &Aggregate) -> Option<String> {
    let value = match aggregate {
        Aggregate::Avg(a) => a.value(),
        Aggregate::Sum(a) => a.value(),
        Aggregate::Min(a) => a.value(),
        Aggregate::Max(a) => a.value(),
        Aggregate::ValueCount(a) => a.value(),
        Aggregate::WeightedAvg(a) => a.value(),
        Aggregate::MedianAbsoluteDeviation(a) => a.value(),
        Aggregate::SimpleValue(a) => a.value(),
        Aggregate::Derivative(a) => a.value(),
        Aggregate::Cardinality(a) => return Some(format!("{}", a.value())),
        Aggregate::Stats(s) => {
            return Some(format!(
                "count={} min={} max={} avg={:.3} sum={}",
                s.count(),
                s.min(),
                s.max(),
                s.avg(),
                s.sum()
            ));
        }
        Aggregate::TDigestPercentiles(p) => return Some(format_percentiles(p.values())),
        Aggregate::HdrPercentiles(p) => return Some(format_percentiles(p.values())),
        _ => return None,
    };
    Some(format!("{:.6}", value))
}

fn format_percentiles(values: &Percentiles) -> String {
    match values {
        Percentiles::Keyed(map) => map
            .iter()
            .map(|(key, value)| format!("p{}={:?}", key, value.as_f64()))
            .collect::<Vec<_>>()
            .join(" "),
        Percentiles::Array(items) => items
            .iter()
            .map(|item| format!("p{}={:?}", item.key(), item.value()))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn print_buckets<B: BucketFields>(buckets: &Buckets<B>, label: impl Fn(&B) -> String, depth: usize) {
    let indent = "  ".repeat(depth);
    let shape = if buckets.is_keyed() { "keyed" } else { "array" };
    println!("{}{} buckets ({})", indent, buckets.len(), shape);
    for bucket in buckets.values().take(10) {
        println!("{}- {} doc_count={}", indent, label(bucket), bucket.doc_count());
        print_aggregations(bucket.aggregations(), depth + 2);
    }
    if buckets.len() > 10 {
        println!("{}  ... and {} more buckets", indent, buckets.len() - 10);
    }
}

fn print_aggregations(aggregations: &BTreeMap<String, Aggregate>, depth: usize) {
    let indent = "  ".repeat(depth);
    for (name, aggregate) in aggregations {
        let kind = aggregate.kind().json_value();
        if let Some(summary) = format_metric(aggregate) {
            println!("{}{} [{}] {}", indent, name, kind, summary);
            continue;
        }

        println!("{}{} [{}]", indent, name, kind);
        match aggregate {
            Aggregate::Sterms(a) => print_buckets(a.buckets(), |b| format!("{:?}", b.key()), depth + 1),
            Aggregate::Lterms(a) => print_buckets(a.buckets(), |b| b.key().to_string(), depth + 1),
            Aggregate::Dterms(a) => print_buckets(a.buckets(), |b| b.key().to_string(), depth + 1),
            Aggregate::Histogram(a) => print_buckets(a.buckets(), |b| b.key().to_string(), depth + 1),
            Aggregate::DateHistogram(a) => print_buckets(
                a.buckets(),
                |b| b.key_as_string().map(str::to_string).unwrap_or_else(|| b.key().to_string()),
                depth + 1,
            ),
            Aggregate::Range(a) => print_buckets(
                a.buckets(),
                |b| b.key().map(str::to_string).unwrap_or_else(|| format!("{:?}..{:?}", b.from(), b.to())),
                depth + 1,
            ),
            Aggregate::Filters(a) => print_buckets(a.buckets(), |_| "filter".to_string(), depth + 1),
            Aggregate::Filter(a) => {
                println!("{}  doc_count={}", indent, a.doc_count());
                print_aggregations(a.aggregations(), depth + 1);
            }
            Aggregate::Global(a) => {
                println!("{}  doc_count={}", indent, a.doc_count());
                print_aggregations(a.aggregations(), depth + 1);
            }
            Aggregate::Missing(a) => {
                println!("{}  doc_count={}", indent, a.doc_count());
                print_aggregations(a.aggregations(), depth + 1);
            }
            _ => {}
        }
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "response.json".to_string());

    println!("Reading: {}", path);

    let data = fs::read_to_string(&path).expect("Failed to read file");
    println!("File size: {} bytes", data.len());

    let value: serde_json::Value = serde_json::from_str(&data).expect("Failed to parse JSON");
    let aggregations_value = value.get("aggregations").unwrap_or(&value);

    let aggregations =
        read_aggregate_map(&mut Reader::new(aggregations_value)).expect("Failed to decode aggregations");

    println!("\n=== Aggregations ({}) ===", aggregations.len());
    print_aggregations(&aggregations, 0);

    let encoded = opensearch_codec::encode_aggregations(&aggregations).expect("Failed to encode");
    println!("\nRe-encoded size: {} bytes", encoded.len());
}
