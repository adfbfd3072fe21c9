//! Pure engine logic - no I/O, no async, no side effects.
//!
//! This crate provides:
//! - Wire types for the render context and the engine output
//! - Pool configuration with validation
//! - Polyfill generation for the server bundle prelude
//!
//! # Example
//!
//! ```
//! use strata_core::RuntimeConfig;
//! use strata_ssr_core::{generate_polyfills, EngineRequest, EngineRequestInfo, SsrPoolConfig};
//!
//! let request = EngineRequest {
//!     url: "/".to_string(),
//!     no_ssr: false,
//!     error: false,
//!     runtime_config: RuntimeConfig::default(),
//!     payload: None,
//!     island: None,
//!     request: EngineRequestInfo::default(),
//! };
//!
//! // Serialize with size validation
//! let json = request.to_json().unwrap();
//!
//! // Generate the prelude (pure string transformation)
//! let polyfills = generate_polyfills(&json, "production").unwrap();
//! assert!(polyfills.contains("__STRATA_SSR_CONTEXT__"));
//!
//! let pool_config = SsrPoolConfig::with_defaults(4).unwrap();
//! assert_eq!(pool_config.worker_count, 4);
//! ```

mod config;
mod engine;
mod error;
mod polyfills;

pub use config::{SsrPoolConfig, DEFAULT_MAX_PENDING, DEFAULT_RENDER_TIMEOUT_MS};
pub use engine::{EngineOutput, EngineRequest, EngineRequestInfo};
pub use error::{Result, SsrCoreError, MAX_CONTEXT_SIZE};
pub use polyfills::generate_polyfills;
