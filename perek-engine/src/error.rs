//! Layered error types
//!
//! The pipeline favors degraded-but-deterministic output over hard failure:
//! only programmer-configuration errors surface here, and they surface at
//! construction time rather than mid-processing.

use perek_core::CoreError;
use thiserror::Error;

/// Pipeline construction errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core detector or processor configuration error
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Invalid pipeline configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
