//! Engine worker pool for concurrent rendering.
//!
//! The pool manages multiple worker threads, distributing render requests
//! using round-robin scheduling with backpressure support.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use serde::Serialize;
use strata_core::RuntimeConfig;
use strata_ssr_core::{EngineOutput, EngineRequest, EngineRequestInfo, SsrPoolConfig};
use tokio::sync::oneshot;

use crate::{
    error::{Result, SsrError},
    worker::{RenderRequest, SsrWorker},
};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// A pool of engine workers running the same server bundle.
pub struct SsrPool {
    workers: Vec<SsrWorker>,
    next_worker: AtomicUsize,
    config: Arc<SsrPoolConfig>,
}

impl SsrPool {
    /// Create a new pool.
    ///
    /// Reads the bundle from disk and spawns the worker threads.
    pub fn new(config: SsrPoolConfig, bundle_path: &Path) -> Result<Self> {
        let canonical = bundle_path
            .canonicalize()
            .map_err(|e| SsrError::BundleLoad {
                path: bundle_path.display().to_string(),
                reason: e.to_string(),
            })?;

        if canonical.extension() != Some(OsStr::new("js")) {
            return Err(SsrError::BundleLoad {
                path: bundle_path.display().to_string(),
                reason: "Bundle must be a .js file".to_string(),
            });
        }

        let bundle_code =
            std::fs::read_to_string(&canonical).map_err(|e| SsrError::BundleLoad {
                path: canonical.display().to_string(),
                reason: e.to_string(),
            })?;

        let bundle_code = Arc::new(bundle_code);
        let config = Arc::new(config);

        let workers = (0..config.worker_count)
            .map(|index| {
                SsrWorker::spawn(index, Arc::clone(&bundle_code), Arc::clone(&config))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            worker_count = workers.len(),
            bundle_path = %canonical.display(),
            "SSR pool initialized"
        );

        Ok(Self {
            workers,
            next_worker: AtomicUsize::new(0),
            config,
        })
    }

    /// Render one context.
    ///
    /// Uses round-robin scheduling to distribute requests across workers.
    /// Returns `Overloaded` error if no workers have capacity.
    pub async fn render(&self, request: &EngineRequest) -> Result<EngineOutput> {
        let available = self.workers.iter().filter(|w| w.has_capacity()).count();
        if available == 0 {
            return Err(SsrError::Overloaded {
                retry_after_secs: 5,
            });
        }

        let context_json = request.to_json()?;
        self.dispatch(context_json, self.config.render_timeout())
            .await
            .map(|(output, _)| output)
    }

    async fn dispatch(
        &self,
        context_json: String,
        timeout: Duration,
    ) -> Result<(EngineOutput, usize)> {
        let (response_tx, response_rx) = oneshot::channel();

        let worker_idx = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[worker_idx]
            .sender()
            .send(RenderRequest {
                context_json,
                response_tx,
            })
            .await
            .map_err(|_| SsrError::ChannelClosed)?;

        match tokio::time::timeout(timeout, response_rx).await {
            Ok(Ok(result)) => result.map(|output| (output, worker_idx)),
            Ok(Err(_)) => Err(SsrError::ChannelClosed),
            Err(_) => Err(SsrError::Timeout(timeout.as_millis() as u64)),
        }
    }

    /// Get pool statistics (passive - no I/O).
    pub fn stats(&self) -> SsrPoolStats {
        SsrPoolStats {
            worker_count: self.workers.len(),
            workers_with_capacity: self.workers.iter().filter(|w| w.has_capacity()).count(),
        }
    }

    /// Active health check - renders a minimal context on one worker.
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let start = Instant::now();

        let request = EngineRequest {
            url: "/".to_string(),
            no_ssr: false,
            error: false,
            runtime_config: RuntimeConfig::default(),
            payload: None,
            island: None,
            request: EngineRequestInfo {
                method: "GET".to_string(),
                headers: Default::default(),
            },
        };
        let context_json = request.to_json()?;

        match self.dispatch(context_json, HEALTH_TIMEOUT).await {
            Ok((_, worker_idx)) => Ok(HealthStatus {
                healthy: true,
                latency_ms: start.elapsed().as_millis() as u64,
                worker_idx: Some(worker_idx),
                stats: self.stats(),
                error: None,
            }),
            Err(e @ (SsrError::ChannelClosed | SsrError::Timeout(_))) => Err(e),
            Err(e) => Ok(HealthStatus {
                healthy: false,
                latency_ms: start.elapsed().as_millis() as u64,
                worker_idx: None,
                stats: self.stats(),
                error: Some(e.to_string()),
            }),
        }
    }
}

/// Pool statistics (passive data).
#[derive(Debug, Clone, Serialize)]
pub struct SsrPoolStats {
    pub worker_count: usize,
    pub workers_with_capacity: usize,
}

/// Health check result.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_idx: Option<usize>,
    pub stats: SsrPoolStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_bundle(name: &str, code: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("strata-{name}-{}.js", std::process::id()));
        std::fs::write(&path, code).unwrap();
        path
    }

    fn request(url: &str) -> EngineRequest {
        EngineRequest {
            url: url.to_string(),
            no_ssr: false,
            error: false,
            runtime_config: RuntimeConfig::default(),
            payload: None,
            island: None,
            request: EngineRequestInfo::default(),
        }
    }

    #[test]
    fn test_missing_bundle() {
        let result = SsrPool::new(
            SsrPoolConfig::with_defaults(1).unwrap(),
            Path::new("/nonexistent/strata/server.js"),
        );
        assert!(matches!(result, Err(SsrError::BundleLoad { .. })));
    }

    #[test]
    fn test_bundle_must_be_js() {
        let path = std::env::temp_dir().join(format!("strata-bundle-{}.txt", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let result = SsrPool::new(SsrPoolConfig::with_defaults(1).unwrap(), &path);
        match result {
            Err(SsrError::BundleLoad { reason, .. }) => {
                assert_eq!(reason, "Bundle must be a .js file")
            }
            _ => panic!("expected a bundle load error"),
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_render_reads_context_and_reports_output() {
        let path = write_bundle(
            "echo",
            r#"
            const ctx = globalThis.__STRATA_SSR_CONTEXT__;
            __strataSetResult({
                html: `<p>${ctx.url}</p>`,
                teleports: { "strata-island": "<!--[--><b>x</b><!--]-->" },
                modules: ["src/app.vue"],
                statusCode: 201,
            });
            "#,
        );
        let pool = SsrPool::new(SsrPoolConfig::with_defaults(2).unwrap(), &path).unwrap();

        let output = pool.render(&request("/about")).await.unwrap();
        assert_eq!(output.html, "<p>/about</p>");
        assert_eq!(output.teleports["strata-island"], "<!--[--><b>x</b><!--]-->");
        assert_eq!(output.modules, vec!["src/app.vue"]);
        assert_eq!(output.status_code, Some(201));

        assert_eq!(pool.stats().worker_count, 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_render_without_result() {
        let path = write_bundle("silent", "const unused = 1;");
        let pool = SsrPool::new(SsrPoolConfig::with_defaults(1).unwrap(), &path).unwrap();

        let result = pool.render(&request("/")).await;
        assert!(matches!(result, Err(SsrError::NoOutput)));
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_render_script_error() {
        let path = write_bundle("throws", "throw new Error('component failed');");
        let pool = SsrPool::new(SsrPoolConfig::with_defaults(1).unwrap(), &path).unwrap();

        let result = pool.render(&request("/")).await;
        assert!(matches!(result, Err(SsrError::JsExecution(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
