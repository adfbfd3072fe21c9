//! Core engine error types (pure - no I/O variants).

use thiserror::Error;

/// Maximum size of the serialized render context handed to the engine (5MB).
pub const MAX_CONTEXT_SIZE: usize = 5 * 1024 * 1024;

/// Core engine errors (pure - no I/O variants).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SsrCoreError {
    #[error("Context serialization failed: {0}")]
    Serialization(String),

    #[error("Invalid engine output: {0}")]
    InvalidOutput(String),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Worker queue depth must be at least 1")]
    InvalidQueueDepth,

    #[error("Render timeout must be positive")]
    InvalidTimeout,

    #[error("Render context too large: {size} bytes (max: {max} bytes)")]
    ContextTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, SsrCoreError>;
