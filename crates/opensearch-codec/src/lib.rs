//! Builders and a table-driven JSON codec for OpenSearch aggregations.
//!
//! This crate models the aggregation part of the OpenSearch search API:
//! requests (`terms`, `histogram`, `avg`, ...) and the results a search
//! response carries for them.
//!
//! # Overview
//!
//! Every value type is described by a **field codec table**: an ordered list
//! of JSON keys, each bound to a reader that fills a builder slot and a
//! writer that emits the member. Decoding and encoding walk the same table.
//!
//! - **Builders** are single-use: `build()` checks required fields and then
//!   refuses to run again.
//! - **Tagged unions** (`Buckets`, `Percentiles`, `TermsInclude`) pick a
//!   variant from the JSON shape; accessors for the wrong variant fail.
//! - **Typed keys** (`sterms#by_tag`) carry the result kind next to the
//!   user's name, and select the concrete result type from a closed registry.
//!
//! # Quick Start
//!
//! ```rust
//! use opensearch_codec::codec::{decode_aggregations, encode_aggregations};
//! use opensearch_codec::prelude::*;
//!
//! let json = r#"{
//!     "avg#avg_price": {"value": 12.5},
//!     "sterms#by_tag": {
//!         "doc_count_error_upper_bound": 0,
//!         "sum_other_doc_count": 0,
//!         "buckets": [{"key": "rust", "doc_count": 3}]
//!     }
//! }"#;
//!
//! let aggregations = decode_aggregations(json).unwrap();
//! assert_eq!(aggregations["avg_price"].avg().unwrap().value(), 12.5);
//!
//! let terms = aggregations["by_tag"].sterms().unwrap();
//! assert_eq!(terms.buckets().array().unwrap()[0].key(), "rust");
//!
//! // Typed keys are written back, so the output decodes again.
//! let encoded = encode_aggregations(&aggregations).unwrap();
//! assert!(encoded.contains("sterms#by_tag"));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Requests, results, unions and builders
//! - [`codec`]: JSON reader/writer, codec tables, typed keys and entry points
//! - [`validate`]: Semantic checks on request trees
//! - [`error`]: Error types
//! - [`limits`]: Decode limits
//! - [`prelude`]: Traits for base-field accessors
//!
//! # Security
//!
//! The decoder is designed to safely handle untrusted input:
//! - Input length and nesting depth are bounded by configurable limits
//! - Errors carry the JSON path of the offending value
//! - Library code never panics on malformed input

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod prelude;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    DecodeOptions, EncodeOptions, decode_aggregations, decode_str, decode_value, encode_aggregations, encode_string,
    encode_value,
};
pub use error::{BuildError, DecodeError, EncodeError, ErrorKind, ValidationError, VariantMismatch};
pub use model::{
    Aggregate, AggregateKind, Aggregation, AggregationKind, AggregationVariant, Buckets, FieldValue, JsonData,
    Percentiles, TermsInclude,
};
pub use validate::{validate_aggregation, validate_aggregations};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
