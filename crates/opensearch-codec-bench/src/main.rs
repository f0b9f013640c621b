//! Benchmark for aggregation result encoding/decoding.
//!
//! Builds a synthetic `sterms` response whose buckets each carry `avg` and
//! `stats` sub-aggregations, then times encode, decode and a re-encode.

use std::collections::BTreeMap;
use std::time::Instant;

use opensearch_codec::model::aggregate::{AvgAggregate, StatsAggregate, StringTermsAggregate, StringTermsBucket};
use opensearch_codec::prelude::*;
use opensearch_codec::{Aggregate, EncodeOptions, decode_aggregations, encode_aggregations};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_BUCKETS: usize = 50_000;
const DECODE_ITERS: u32 = 10;

// =============================================================================
// SYNTHETIC RESPONSE
// =============================================================================

fn build_bucket(index: usize) -> StringTermsBucket {
    let doc_count = (index % 1_000 + 1) as i64;
    let price = (index % 400) as f64 / 4.0;

    let avg = AvgAggregate::builder()
        .value(price)
        .build()
        .expect("Failed to build avg");
    let stats = StatsAggregate::builder()
        .count(doc_count)
        .min(0.0)
        .max(price * 2.0)
        .avg(price)
        .sum(price * doc_count as f64)
        .build()
        .expect("Failed to build stats");

    StringTermsBucket::builder()
        .key(format!("term-{:06}", index))
        .doc_count(doc_count)
        .aggregation("avg_price", avg)
        .aggregation("price_stats", stats)
        .build()
        .expect("Failed to build bucket")
}

fn build_response(buckets: usize) -> BTreeMap<String, Aggregate> {
    let terms = StringTermsAggregate::builder()
        .buckets((0..buckets).map(build_bucket).collect::<Vec<_>>())
        .doc_count_error_upper_bound(0)
        .sum_other_doc_count(0)
        .build()
        .expect("Failed to build terms");

    let mut aggregations = BTreeMap::new();
    aggregations.insert("by_term".to_string(), Aggregate::from(terms));
    aggregations
}

fn throughput(bytes: usize, secs: f64) -> f64 {
    (bytes as f64 / 1_000_000.0) / secs
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let buckets = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>().expect("bucket count must be a number"))
        .unwrap_or(DEFAULT_BUCKETS);

    info!(buckets, "building synthetic response");

    let build_start = Instant::now();
    let aggregations = build_response(buckets);
    let build_time = build_start.elapsed();
    println!("Built {} buckets in {:?}", buckets, build_time);

    // Encoding
    let encode_start = Instant::now();
    let encoded = encode_aggregations(&aggregations).expect("Failed to encode");
    let encode_time = encode_start.elapsed();

    println!("\nEncode: {} bytes in {:?}", encoded.len(), encode_time);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), encode_time.as_secs_f64()));

    // Encoding without typed keys (display form, not decodable)
    let plain_start = Instant::now();
    let plain = opensearch_codec::codec::typed_keys::encode_aggregations_with_options(
        &aggregations,
        EncodeOptions::new().with_typed_keys(false),
    )
    .expect("Failed to encode without typed keys");
    let plain_time = plain_start.elapsed();

    println!("\nEncode (no typed keys): {} bytes in {:?}", plain.len(), plain_time);

    // Decoding
    for _ in 0..3 {
        let _ = decode_aggregations(&encoded).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(decode_aggregations(&encoded).expect("Failed to decode"));
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;
    let decoded = decoded.expect("decode loop ran at least once");

    println!("\nDecode: {:?} (avg of {} iterations)", decode_time, DECODE_ITERS);
    println!("  Throughput: {:.2} MB/s", throughput(encoded.len(), decode_time.as_secs_f64()));

    let terms = decoded["by_term"].sterms().expect("by_term should be sterms");
    assert_eq!(terms.buckets().len(), buckets);
    assert_eq!(decoded, aggregations);

    // Re-encoding the decoded tree must reproduce the same text
    let reencoded = encode_aggregations(&decoded).expect("Failed to re-encode");
    assert_eq!(reencoded, encoded, "Re-encoding should be a fixpoint");
    println!("\nFixpoint: ok");

    // Summary
    println!("\n=== Summary ===");
    println!("Buckets: {}", buckets);
    println!(
        "JSON size: {} bytes ({:.1} MB), {} bytes without typed keys",
        encoded.len(),
        encoded.len() as f64 / 1_000_000.0,
        plain.len()
    );
    println!(
        "Encode {:.2} MB/s, decode {:.2} MB/s",
        throughput(encoded.len(), encode_time.as_secs_f64()),
        throughput(encoded.len(), decode_time.as_secs_f64())
    );
}
