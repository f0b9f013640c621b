//! Error types for JSON encoding/decoding, builders, and request validation.

use thiserror::Error;

use crate::codec::JsonKind;

/// Error categories shared by every error type in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field was never set before `build()`.
    MissingRequiredField,
    /// A builder's terminal step was invoked more than once.
    AlreadyBuilt,
    /// A JSON key had no binding and the type installs no unknown-field handler.
    UnknownField,
    /// A tagged-union accessor was called for a variant other than the stored one.
    VariantMismatch,
    /// None of a tagged union's candidate decoders accepted the input.
    NoMatchingVariant,
    /// A typed key named a kind absent from the closed registry.
    UnrecognizedKind,
    /// Malformed JSON, wrong JSON types, or a decode limit was hit.
    Malformed,
    /// A request failed semantic validation.
    Invalid,
}

impl ErrorKind {
    /// Returns a stable, lowercase name for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "missing_required_field",
            ErrorKind::AlreadyBuilt => "already_built",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::VariantMismatch => "variant_mismatch",
            ErrorKind::NoMatchingVariant => "no_matching_variant",
            ErrorKind::UnrecognizedKind => "unrecognized_kind",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Invalid => "invalid",
        }
    }
}

/// Error raised by a builder's terminal `build()` step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("missing required field '{field}' in {type_name}")]
    MissingRequiredField {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("{type_name} builder was already built")]
    AlreadyBuilt { type_name: &'static str },
}

impl BuildError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            BuildError::AlreadyBuilt { .. } => ErrorKind::AlreadyBuilt,
        }
    }
}

/// A tagged-union accessor was called for the wrong variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot access variant '{requested}' of {union}: current variant is '{actual}'")]
pub struct VariantMismatch {
    pub union: &'static str,
    pub requested: &'static str,
    pub actual: &'static str,
}

impl VariantMismatch {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::VariantMismatch
    }
}

/// Error during JSON decoding.
///
/// Paths use `$` for the document root, `.key` for object members and
/// `[n]` for array elements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("nesting depth exceeds maximum {max} at {path}")]
    DepthLimitExceeded { path: String, max: usize },

    #[error("expected {expected} at {path}, found {found}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: JsonKind,
    },

    #[error("invalid number {value:?} at {path}: expected {expected}")]
    InvalidNumber {
        path: String,
        expected: &'static str,
        value: String,
    },

    #[error("invalid {enum_name} value {value:?} at {path}")]
    InvalidEnumValue {
        path: String,
        enum_name: &'static str,
        value: String,
    },

    #[error("unknown field '{field}' in {type_name} at {path}")]
    UnknownField {
        type_name: &'static str,
        field: String,
        path: String,
    },

    #[error("no variant of {union} matches {found} at {path}")]
    NoMatchingVariant {
        union: &'static str,
        found: JsonKind,
        path: String,
    },

    #[error("unrecognized kind '{kind}' at {path}")]
    UnrecognizedKind { kind: String, path: String },

    #[error("{union} at {path} has more than one variant key ('{first}' and '{second}')")]
    MultipleVariants {
        union: &'static str,
        first: &'static str,
        second: String,
        path: String,
    },

    #[error("{source} at {path}")]
    Build {
        path: String,
        #[source]
        source: BuildError,
    },
}

impl DecodeError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::UnknownField { .. } => ErrorKind::UnknownField,
            DecodeError::NoMatchingVariant { .. } => ErrorKind::NoMatchingVariant,
            DecodeError::UnrecognizedKind { .. } => ErrorKind::UnrecognizedKind,
            DecodeError::Build { source, .. } => source.kind(),
            _ => ErrorKind::Malformed,
        }
    }

    /// Returns the JSON path the error refers to, if it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::DepthLimitExceeded { path, .. }
            | DecodeError::UnexpectedType { path, .. }
            | DecodeError::InvalidNumber { path, .. }
            | DecodeError::InvalidEnumValue { path, .. }
            | DecodeError::UnknownField { path, .. }
            | DecodeError::NoMatchingVariant { path, .. }
            | DecodeError::UnrecognizedKind { path, .. }
            | DecodeError::MultipleVariants { path, .. }
            | DecodeError::Build { path, .. } => Some(path),
            DecodeError::Json(_) | DecodeError::LengthExceedsLimit { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Error during JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("non-finite number in field '{field}' cannot be represented in JSON")]
    NonFiniteNumber { field: String },

    #[error("invalid writer state: {context}")]
    InvalidWriterState { context: &'static str },

    #[error("JSON output failed: {0}")]
    Json(String),
}

impl EncodeError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Malformed
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Json(err.to_string())
    }
}

/// Error during semantic validation of aggregation requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid aggregation name {name:?}: names must be non-empty and cannot contain '[', ']' or '>'")]
    InvalidName { name: String },

    #[error("aggregation '{name}' of kind {kind} cannot have sub-aggregations")]
    SubAggregationsNotAllowed { name: String, kind: &'static str },

    #[error("aggregation '{name}' of kind {kind} requires '{field}'")]
    MissingParameter {
        name: String,
        kind: &'static str,
        field: &'static str,
    },

    #[error("aggregation '{name}': {field} {reason}")]
    InvalidParameter {
        name: String,
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Invalid
    }
}
