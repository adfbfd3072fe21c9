//! The server bundle as a [`ServerEntry`].

use std::sync::Arc;

use async_trait::async_trait;
use strata_renderer::{AppRender, RenderError, ServerEntry, SsrContext};
use strata_ssr_core::{EngineOutput, EngineRequest, EngineRequestInfo};

use crate::error::sanitize_error;
use crate::pool::SsrPool;

/// Renders through the engine pool and applies the bundle's output to the
/// request context.
pub struct DenoServerEntry {
    pool: Arc<SsrPool>,
}

impl DenoServerEntry {
    pub fn new(pool: Arc<SsrPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<SsrPool> {
        &self.pool
    }
}

#[async_trait]
impl ServerEntry for DenoServerEntry {
    async fn render(&self, ctx: &mut SsrContext) -> Result<AppRender, RenderError> {
        let request = engine_request(ctx);
        let output = self.pool.render(&request).await.map_err(|e| {
            tracing::error!(url = %ctx.url, error = %e, "Server bundle render failed");
            RenderError::Engine(sanitize_error(&e))
        })?;
        Ok(apply_output(ctx, output))
    }
}

/// Snapshot of the context sent to the bundle.
fn engine_request(ctx: &SsrContext) -> EngineRequest {
    let headers = ctx
        .request
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    EngineRequest {
        url: ctx.url.clone(),
        no_ssr: ctx.no_ssr,
        error: ctx.error,
        runtime_config: ctx.runtime_config.clone(),
        payload: ctx.payload.clone(),
        island: ctx.island_context.clone(),
        request: EngineRequestInfo {
            method: ctx.request.method.to_string(),
            headers,
        },
    }
}

/// Copy what the bundle reported into the context and return its markup.
fn apply_output(ctx: &mut SsrContext, output: EngineOutput) -> AppRender {
    let EngineOutput {
        html,
        teleports,
        payload,
        styles,
        meta,
        modules,
        status_code,
        status_message,
    } = output;

    if payload.is_some() {
        ctx.payload = payload;
    }
    if styles.is_some() {
        ctx.styles = styles;
    }
    ctx.modules.extend(modules);
    if let Some(code) = status_code {
        ctx.response.set_status(code, status_message);
    }
    if let Some(meta) = meta {
        ctx.set_render_meta(move || std::future::ready(meta));
    }

    AppRender { html, teleports }
}
