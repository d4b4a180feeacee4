//! Core error types (deterministic only)
//!
//! Runtime conditions never fail here: detectors and processors degrade to
//! deterministic output instead. The only errors are construction-time
//! configuration mistakes.

use thiserror::Error;

/// Detector and processor construction errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configured heading pattern failed to compile
    #[error("invalid heading pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern source that failed to compile
        pattern: String,
        /// The underlying regex error
        source: regex::Error,
    },

    /// Invalid detector or processor configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
