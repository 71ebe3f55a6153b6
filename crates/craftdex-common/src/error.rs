//! Error types for Craftdex.

use thiserror::Error;

/// Top-level error type for Craftdex operations.
#[derive(Debug, Error)]
pub enum CraftdexError {
    /// Malformed or missing caller input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A caller broke an internal contract (e.g. a non-rectangular shape)
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Catalog snapshot errors
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl CraftdexError {
    /// Returns true for request-scoped validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Request validation errors, surfaced to the caller and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No grid was supplied
    #[error("missing query")]
    MissingQuery,

    /// Grid length cannot form a 3x3 grid
    #[error("malformed grid: {len} cells cannot form rows of 3")]
    MalformedGrid {
        /// Number of cells received
        len: usize,
    },

    /// A required parameter was absent
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter had a value outside its domain
    #[error("invalid {field}: {value:?}")]
    InvalidValue {
        /// Parameter name
        field: &'static str,
        /// Value received
        value: String,
    },
}

/// Result type alias for Craftdex operations.
pub type CraftdexResult<T> = Result<T, CraftdexError>;
