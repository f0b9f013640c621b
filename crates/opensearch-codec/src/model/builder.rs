//! Builder discipline shared by every value type.
//!
//! Builders are mutable staging objects: setters take `&mut self`, assign one
//! slot, and return the builder for chaining. The terminal `build()` step may
//! run once per builder; a second call fails with `AlreadyBuilt`.
//!
//! ```rust
//! use opensearch_codec::model::aggregate::AvgAggregateBuilder;
//! use opensearch_codec::prelude::*;
//!
//! let mut builder = AvgAggregateBuilder::new();
//! let avg = builder.value(1.5).build().unwrap();
//! assert_eq!(avg.value(), 1.5);
//! assert!(builder.build().is_err());
//! ```

use crate::error::BuildError;

/// One-shot flag guarding a builder's terminal step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleUse {
    built: bool,
}

impl SingleUse {
    /// Marks the builder as consumed, failing if it already was.
    ///
    /// Called before required fields are checked, so a builder whose first
    /// `build()` failed cannot be retried either.
    pub fn consume(&mut self, type_name: &'static str) -> Result<(), BuildError> {
        if self.built {
            return Err(BuildError::AlreadyBuilt { type_name });
        }
        self.built = true;
        Ok(())
    }

    /// Returns true once the terminal step has run.
    pub fn is_built(&self) -> bool {
        self.built
    }
}

/// Unwraps a required slot or reports which field was missing.
pub fn require<T>(value: Option<T>, type_name: &'static str, field: &'static str) -> Result<T, BuildError> {
    value.ok_or(BuildError::MissingRequiredField { type_name, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_use() {
        let mut guard = SingleUse::default();
        assert!(!guard.is_built());
        assert_eq!(guard.consume("Thing"), Ok(()));
        assert_eq!(
            guard.consume("Thing"),
            Err(BuildError::AlreadyBuilt { type_name: "Thing" })
        );
    }

    #[test]
    fn test_require() {
        assert_eq!(require(Some(1), "Thing", "a"), Ok(1));
        assert_eq!(
            require::<i32>(None, "Thing", "a"),
            Err(BuildError::MissingRequiredField {
                type_name: "Thing",
                field: "a"
            })
        );
    }
}
