//! Unified error types for satyr.

use thiserror::Error;

/// The main error type for satyr operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input text (bad problem line, bad clause token).
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Structurally well-formed input that violates DIMACS semantics.
    #[error("invalid formula: {0}")]
    Invalid(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal solver error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
