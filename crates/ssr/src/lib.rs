//! Server bundle worker pool - Imperative Shell.
//!
//! This crate runs the application's server bundle with `deno_core` on
//! dedicated worker threads, using pure functions from `strata_ssr_core`, and
//! plugs it into the render pipeline of `strata_renderer`.
//!
//! # Architecture
//!
//! - **Functional Core** (`strata_ssr_core`): wire types, config validation, polyfills
//! - **Imperative Shell** (this crate): I/O, threading, JsRuntime execution
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use strata_renderer::RendererFactory;
//! use strata_ssr::{BundleAssetSource, SsrPoolConfig};
//!
//! let pool_config = SsrPoolConfig::with_defaults(4).unwrap();
//! let source = BundleAssetSource::new(
//!     ".output/client.manifest.json",
//!     ".output/server.js",
//!     pool_config,
//! );
//! let factory = RendererFactory::new(Arc::new(source), runtime_config);
//! ```

mod entry;
mod error;
mod pool;
mod runtime;
mod source;
mod worker;

// Re-export core types for convenience
pub use strata_ssr_core::{
    EngineOutput, EngineRequest, EngineRequestInfo, SsrCoreError, SsrPoolConfig, DEFAULT_MAX_PENDING,
    DEFAULT_RENDER_TIMEOUT_MS, MAX_CONTEXT_SIZE,
};

pub use entry::DenoServerEntry;
pub use error::{sanitize_error, Result, SsrError};
pub use pool::{HealthStatus, SsrPool, SsrPoolStats};
pub use source::BundleAssetSource;
