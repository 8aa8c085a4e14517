//! Error types for beam geometry and hit testing.

use thiserror::Error;

/// Errors raised before any geometric work begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Caller supplied malformed input (length mismatch, non-finite or
    /// negative values).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Phantom kind tag outside {plane, cylinder, human}.
    #[error("unsupported phantom kind: {0:?}")]
    UnsupportedPhantomKind(String),

    /// Inputs would collapse the beam to a plane, line or point.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
