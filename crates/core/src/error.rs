//! Core render errors (pure - no I/O variants).

use thiserror::Error;

/// Core render errors (pure - no I/O variants).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("State serialization failed: {0}")]
    Serialization(String),

    #[error("Invalid client manifest: {0}")]
    InvalidManifest(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
