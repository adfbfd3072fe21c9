//! Top-level render orchestration.
//!
//! One call to [`RenderDispatcher::render`] handles one request: classify it,
//! build the context, render through the cached renderer, collect fragments
//! and produce either an HTML document or an island JSON body.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::Method;
use strata_core::{
    extract_html_tags, normalize_chunks, render_html_document, render_state_script,
    resolve_island_context, strip_html_comments, HtmlContext, IslandContext, IslandParams,
    CoreError, IslandResponse, JsonStateSerializer, PayloadError, RenderedMeta, RuntimeConfig,
    StateSerializer, ERROR_MARKER, ISLAND_MARKER, ISLAND_TELEPORT,
};

use crate::context::{build_ssr_context, IncomingRequest, ResponseHandle, SsrContext};
use crate::error::{DispatchError, RenderError, Result};
use crate::factory::RendererFactory;
use crate::hooks::HookRegistry;
use crate::renderer::{RenderMode, RenderedOutput};

const HTML_CONTENT_TYPE: &str = "text/html;charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const POWERED_BY: &str = "Strata";

/// Transport-agnostic response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub body: String,
    pub status_code: u16,
    pub status_message: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl RenderResponse {
    fn new(body: String, content_type: &str, response: &ResponseHandle) -> Self {
        let status = response.status();
        let headers = BTreeMap::from([
            ("content-type".to_string(), content_type.to_string()),
            ("x-powered-by".to_string(), POWERED_BY.to_string()),
        ]);
        Self {
            body,
            status_code: status.status_code,
            status_message: status.status_message,
            headers,
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// What a request asks to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    ErrorPage,
    Island,
    Page,
}

impl RequestKind {
    fn classify(url: &str) -> Self {
        if url.starts_with(ERROR_MARKER) {
            Self::ErrorPage
        } else if url.starts_with(ISLAND_MARKER) {
            Self::Island
        } else {
            Self::Page
        }
    }
}

pub struct RenderDispatcher {
    factory: Arc<RendererFactory>,
    runtime_config: Arc<RuntimeConfig>,
    hooks: HookRegistry,
    serializer: Arc<dyn StateSerializer>,
    force_no_ssr: bool,
}

impl RenderDispatcher {
    pub fn new(factory: Arc<RendererFactory>, runtime_config: Arc<RuntimeConfig>) -> Self {
        Self {
            factory,
            runtime_config,
            hooks: HookRegistry::new(),
            serializer: Arc::new(JsonStateSerializer),
            force_no_ssr: false,
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn StateSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Disable full server rendering for every request.
    pub fn force_no_ssr(mut self, force: bool) -> Self {
        self.force_no_ssr = force;
        self
    }

    /// Render one request.
    ///
    /// `Ok(None)` means there is nothing to send: an error page whose render
    /// failed. The transport decides what to answer in that case.
    pub async fn render(
        &self,
        request: IncomingRequest,
        response: ResponseHandle,
    ) -> Result<Option<RenderResponse>> {
        let request = Arc::new(request);
        let kind = RequestKind::classify(request.url());

        let ssr_error = (kind == RequestKind::ErrorPage)
            .then(|| PayloadError::from_query(request.query()));
        let island_context = (kind == RequestKind::Island).then(|| resolve_island(&request));

        let mut ctx = build_ssr_context(
            Arc::clone(&request),
            response.clone(),
            &self.runtime_config,
            self.force_no_ssr,
            ssr_error,
            island_context,
        );
        let mode = RenderMode::for_context(&ctx);
        tracing::debug!(url = %ctx.url, ?kind, ?mode, "Rendering request");

        let rendered = match self.render_app(mode, &mut ctx).await {
            Ok(rendered) => Some(rendered),
            Err(e) if ctx.error => {
                tracing::warn!(url = %ctx.url, error = %e, "Error page render failed");
                None
            }
            Err(e) => {
                tracing::error!(url = %ctx.url, error = %e, "Render failed");
                return Err(DispatchError::Render(e));
            }
        };
        self.hooks.call_app_rendered(&ctx);

        let Some(mut rendered) = rendered else {
            return Ok(None);
        };
        if !ctx.error {
            if let Some(error) = ctx.payload_error() {
                return Err(DispatchError::Application(error.clone()));
            }
        }

        let meta = ctx.render_meta().await;
        let state_script =
            match render_state_script(self.serializer.as_ref(), ctx.payload.as_ref()) {
                Ok(script) => script,
                Err(e) => return serialization_failed(&ctx, e),
            };
        let mut html = collect_html_context(&ctx, &mut rendered, meta, state_script);

        self.hooks.call_render_html(&mut html, &request);

        if let Some(island) = ctx.island_context.as_ref().filter(|island| island.wants_json()) {
            let mut island_response = IslandResponse {
                id: island.id.clone(),
                html: island_html(&rendered),
                state: ctx
                    .payload
                    .as_ref()
                    .map(|payload| payload.state.clone())
                    .unwrap_or_default(),
                tags: html
                    .head
                    .iter()
                    .flat_map(|head| extract_html_tags(head))
                    .collect(),
            };
            self.hooks
                .call_render_island(&mut island_response, &request, island);

            return match serde_json::to_string_pretty(&island_response) {
                Ok(body) => Ok(Some(RenderResponse::new(body, JSON_CONTENT_TYPE, &response))),
                Err(e) => serialization_failed(&ctx, CoreError::Serialization(e.to_string())),
            };
        }

        Ok(Some(RenderResponse::new(
            render_html_document(&html),
            HTML_CONTENT_TYPE,
            &response,
        )))
    }

    async fn render_app(
        &self,
        mode: RenderMode,
        ctx: &mut SsrContext,
    ) -> std::result::Result<RenderedOutput, RenderError> {
        let renderer = self.factory.acquire(mode).await?;
        renderer.render_to_string(ctx).await
    }
}

/// Error pages never fail the caller: a serialization failure there means
/// nothing to send.
fn serialization_failed(ctx: &SsrContext, error: CoreError) -> Result<Option<RenderResponse>> {
    if ctx.error {
        tracing::warn!(url = %ctx.url, error = %error, "Error page serialization failed");
        return Ok(None);
    }
    tracing::error!(url = %ctx.url, error = %error, "Response serialization failed");
    Err(DispatchError::Serialization(error))
}

fn resolve_island(request: &IncomingRequest) -> IslandContext {
    let params = if request.method == Method::GET {
        IslandParams::Query(request.query())
    } else {
        IslandParams::Body(request.body.as_ref())
    };
    resolve_island_context(request.url(), params)
}

fn island_html(rendered: &RenderedOutput) -> String {
    match rendered.teleport(ISLAND_TELEPORT) {
        Some(html) => strip_html_comments(html),
        None => {
            tracing::warn!(slot = ISLAND_TELEPORT, "Island teleport slot is missing");
            String::new()
        }
    }
}

/// Gather every fragment into document sections.
///
/// Within a section the order is metadata, renderer output, then teleports.
fn collect_html_context(
    ctx: &SsrContext,
    rendered: &mut RenderedOutput,
    meta: RenderedMeta,
    state_script: String,
) -> HtmlContext {
    let island = ctx.island_context.is_some();
    HtmlContext {
        island,
        html_attrs: normalize_chunks([meta.html_attrs]),
        head: normalize_chunks([
            meta.head_tags,
            rendered.render_resource_hints(),
            rendered.render_styles(),
            ctx.styles.clone(),
        ]),
        body_attrs: normalize_chunks([meta.body_attrs]),
        body_prepend: normalize_chunks([
            meta.body_scripts_prepend,
            rendered.teleport("body").map(str::to_string),
        ]),
        body: if island {
            Vec::new()
        } else {
            vec![rendered.html.clone()]
        },
        body_append: normalize_chunks([
            Some(state_script),
            rendered.render_scripts(),
            meta.body_scripts,
        ]),
    }
}
