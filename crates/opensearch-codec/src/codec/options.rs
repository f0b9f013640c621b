//! Options for the `decode_*` and `encode_*` entry points.

use crate::limits::{MAX_INPUT_LEN, MAX_NESTING_DEPTH};

/// Options controlling decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth below the root value.
    pub max_depth: usize,
    /// Maximum input length in bytes.
    pub max_input_len: usize,
    /// Skip keys that have no binding instead of failing with `UnknownField`.
    ///
    /// Types with an unknown-field handler (typed-keys containers) route
    /// unknown keys to the handler regardless of this setting.
    pub ignore_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
            max_input_len: MAX_INPUT_LEN,
            ignore_unknown_fields: false,
        }
    }
}

impl DecodeOptions {
    /// Creates options with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum input length in bytes.
    pub fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }

    /// Skips unbound keys instead of failing.
    pub fn with_ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }
}

/// Options controlling encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Pretty-print string output.
    pub pretty: bool,
    /// Write nested aggregate results as `kind#name` keys.
    ///
    /// Disable only for display: without the kind prefix the output
    /// cannot be decoded back into typed results.
    pub typed_keys: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            typed_keys: true,
        }
    }
}

impl EncodeOptions {
    /// Creates compact, typed-keys options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables pretty printing.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Enables or disables `kind#name` keys for nested results.
    pub fn with_typed_keys(mut self, typed_keys: bool) -> Self {
        self.typed_keys = typed_keys;
        self
    }
}
