//! Traits needed to call base-field getters and setters and the codec
//! entry points.
//!
//! ```rust
//! use opensearch_codec::prelude::*;
//! ```

pub use crate::codec::{Decode, Encode, JsonEnum, TaggedUnion};
pub use crate::model::aggregate::{
    AggregateFields, AggregateSetters, BucketFields, BucketSetters, MultiBucketFields, MultiBucketSetters,
    PercentilesFields, PercentilesSetters, SingleMetricFields, SingleMetricSetters, TermsFields, TermsSetters,
};
pub use crate::model::aggregation::{MetricAggregationFields, MetricAggregationSetters};
