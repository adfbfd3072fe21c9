//! Engine worker threads.
//!
//! `deno_core::JsRuntime` is not `Send`, so every worker owns a named OS
//! thread with a current-thread Tokio runtime and serves renders from a
//! bounded queue.

use std::sync::Arc;

use strata_ssr_core::{EngineOutput, SsrPoolConfig};
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::{Result, SsrError},
    runtime,
};

/// One queued render.
pub struct RenderRequest {
    /// Serialized `EngineRequest`.
    pub context_json: String,
    pub response_tx: oneshot::Sender<Result<EngineOutput>>,
}

/// Handle to a worker thread; dropping it closes the queue and stops the thread.
pub struct SsrWorker {
    request_tx: mpsc::Sender<RenderRequest>,
}

impl SsrWorker {
    /// Start worker `index` running `bundle_code`.
    pub fn spawn(
        index: usize,
        bundle_code: Arc<String>,
        config: Arc<SsrPoolConfig>,
    ) -> Result<Self> {
        let (request_tx, mut request_rx) = mpsc::channel::<RenderRequest>(config.max_pending);

        std::thread::Builder::new()
            .name(format!("strata-ssr-{index}"))
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("Failed to create Tokio runtime for SSR worker");

                rt.block_on(async move {
                    tracing::debug!(worker = index, "SSR worker started");

                    while let Some(req) = request_rx.recv().await {
                        let result =
                            runtime::render(&bundle_code, &req.context_json, &config.node_env)
                                .await;
                        if let Err(e) = &result {
                            tracing::debug!(worker = index, error = %e, "Render failed in worker");
                        }

                        // The caller may have timed out and dropped the receiver
                        let _ = req.response_tx.send(result);
                    }

                    tracing::debug!(worker = index, "SSR worker shutting down");
                });
            })
            .map_err(|e| SsrError::WorkerSpawn {
                index,
                reason: e.to_string(),
            })?;

        Ok(Self { request_tx })
    }

    /// Whether the queue can take another render without waiting.
    pub fn has_capacity(&self) -> bool {
        self.request_tx.capacity() > 0
    }

    pub fn sender(&self) -> mpsc::Sender<RenderRequest> {
        self.request_tx.clone()
    }
}
