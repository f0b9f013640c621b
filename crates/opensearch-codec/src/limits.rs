//! Decode limits and wire constants.
//!
//! These bound the work a decoder does on untrusted responses. The values
//! are defaults; [`DecodeOptions`](crate::codec::DecodeOptions) can lower
//! or raise them per call.

/// Maximum nesting depth of objects and arrays below the document root.
///
/// Each sub-aggregation level costs three (aggregate, buckets, bucket).
pub const MAX_NESTING_DEPTH: usize = 96;

/// Maximum size of a JSON document accepted by the `decode_*` entry points.
pub const MAX_INPUT_LEN: usize = 64 * 1024 * 1024;

/// Separator between kind and name in a typed key (`sterms#by_tag`).
pub const TYPED_KEYS_SEPARATOR: char = '#';

/// Largest magnitude at which every integer is exactly representable as f64.
///
/// Integral doubles below this are written as JSON integers.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;
