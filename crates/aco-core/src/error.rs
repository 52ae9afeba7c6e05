//! Core error type.
//!
//! Higher crates define their own enums and wrap `AcoError` with `#[from]`.

use thiserror::Error;

/// Errors raised by the core primitives.
#[derive(Debug, Error)]
pub enum AcoError {
    /// A probability mass function rejected by [`CategoricalSampler`][crate::CategoricalSampler].
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A configuration value that failed its parameter validator.
    #[error("configuration error: parameter `{param}`: {reason}")]
    Config { param: &'static str, reason: String },

    #[error("unknown configuration parameter `{0}`")]
    UnknownParameter(String),

    #[error("expected at most {expected} positional parameters, got {got}")]
    TooManyParameters { expected: usize, got: usize },
}

/// Shorthand result type for `aco-core`.
pub type AcoResult<T> = Result<T, AcoError>;
