//! Engine pool configuration with validation.

use std::time::Duration;

use crate::error::{Result, SsrCoreError};

/// Queued renders per worker when not configured.
pub const DEFAULT_MAX_PENDING: usize = 100;

/// Render timeout when not configured.
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 10_000;

/// Validated settings for the engine worker pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsrPoolConfig {
    pub worker_count: usize,
    /// Renders queued on one worker before the pool reports overload.
    pub max_pending: usize,
    pub render_timeout_ms: u64,
    /// `process.env.NODE_ENV` inside the server bundle.
    pub node_env: String,
}

impl SsrPoolConfig {
    pub fn new(
        worker_count: usize,
        max_pending: usize,
        render_timeout_ms: u64,
        node_env: impl Into<String>,
    ) -> Result<Self> {
        if worker_count == 0 {
            return Err(SsrCoreError::InvalidWorkerCount);
        }
        // A worker queue needs room for at least one render
        if max_pending == 0 {
            return Err(SsrCoreError::InvalidQueueDepth);
        }
        if render_timeout_ms == 0 {
            return Err(SsrCoreError::InvalidTimeout);
        }

        Ok(Self {
            worker_count,
            max_pending,
            render_timeout_ms,
            node_env: node_env.into(),
        })
    }

    /// Production settings for `worker_count` workers.
    pub fn with_defaults(worker_count: usize) -> Result<Self> {
        Self::new(
            worker_count,
            DEFAULT_MAX_PENDING,
            DEFAULT_RENDER_TIMEOUT_MS,
            "production",
        )
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }
}
