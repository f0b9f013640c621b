//! Data model types for OpenSearch aggregations.
//!
//! This module contains the value objects the codec reads and writes:
//! - Shared scalars and opaque JSON (`FieldValue`, `JsonData`)
//! - Tagged unions (`Buckets`, `Percentiles`, `TermsInclude`)
//! - Aggregate results, one type per kind (`aggregate`)
//! - Aggregation requests (`aggregation`)
//! - The single-use builder guard (`builder`)

pub mod aggregate;
pub mod aggregation;
pub mod builder;
pub mod buckets;
pub mod json_data;
pub mod percentiles;
pub mod terms_include;

pub use aggregate::{Aggregate, AggregateKind};
pub use aggregation::{Aggregation, AggregationBuilder, AggregationKind, AggregationVariant};
pub use buckets::Buckets;
pub use builder::{SingleUse, require};
pub use json_data::{CalendarInterval, FieldValue, JsonData, SortOrder};
pub use percentiles::{ArrayPercentilesItem, ArrayPercentilesItemBuilder, Percentiles};
pub use terms_include::{TermsInclude, TermsPartition, TermsPartitionBuilder};
