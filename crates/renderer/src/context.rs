//! Per-request SSR context.
//!
//! A context is created for exactly one request, handed by `&mut` to the
//! active renderer and dropped once the response is built.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use http::{HeaderMap, Method, Uri};
use serde_json::Value;
use strata_core::{IslandContext, Payload, PayloadError, RenderedMeta, RuntimeConfig};

/// Request header that disables full server rendering for one request.
pub const NO_SSR_HEADER: &str = "x-strata-no-ssr";

/// Inbound request as seen by the renderer.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Decoded body for non-GET requests.
    pub body: Option<Value>,
}

impl IncomingRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path and query, as received.
    pub fn url(&self) -> &str {
        self.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }

    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or_default()
    }

    /// Whether the no-SSR header is present with a non-empty value.
    pub fn wants_no_ssr(&self) -> bool {
        self.headers
            .get(NO_SSR_HEADER)
            .is_some_and(|value| !value.is_empty())
    }
}

/// Status the transport will answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub status_code: u16,
    pub status_message: Option<String>,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self {
            status_code: 200,
            status_message: None,
        }
    }
}

/// Live handle to the outgoing response status.
///
/// The application may change the status while rendering (for example a 404
/// page); the dispatcher passes whatever is set through unmodified.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle(Arc<Mutex<ResponseStatus>>);

impl ResponseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ResponseStatus {
        self.0.lock().expect("Lock poisoned").clone()
    }

    pub fn set_status(&self, status_code: u16, status_message: Option<String>) {
        *self.0.lock().expect("Lock poisoned") = ResponseStatus {
            status_code,
            status_message,
        };
    }
}

/// Deferred producer of head/body metadata, installed by the renderer.
pub type RenderMetaFn = Box<dyn FnOnce() -> BoxFuture<'static, RenderedMeta> + Send>;

/// Rendering context of one request.
pub struct SsrContext {
    /// Url the application renders.
    pub url: String,
    pub request: Arc<IncomingRequest>,
    pub response: ResponseHandle,
    /// Snapshot of the runtime configuration taken for this request.
    pub runtime_config: RuntimeConfig,
    /// Full server rendering is bypassed for this request.
    pub no_ssr: bool,
    /// This is an error-page render.
    pub error: bool,
    pub payload: Option<Payload>,
    pub island_context: Option<IslandContext>,
    /// Inline styles collected by the renderer.
    pub styles: Option<String>,
    /// Client chunks used while rendering, for preload hints.
    pub modules: BTreeSet<String>,
    render_meta: Option<RenderMetaFn>,
}

impl SsrContext {
    /// Install the metadata callback consulted after rendering.
    pub fn set_render_meta<F, Fut>(&mut self, render: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = RenderedMeta> + Send + 'static,
    {
        self.render_meta = Some(Box::new(move || Box::pin(render())));
    }

    pub fn has_render_meta(&self) -> bool {
        self.render_meta.is_some()
    }

    /// Run the metadata callback once; without one the metadata is empty.
    pub async fn render_meta(&mut self) -> RenderedMeta {
        match self.render_meta.take() {
            Some(render) => render().await,
            None => RenderedMeta::default(),
        }
    }

    /// Error stored in the payload by the application, if any.
    pub fn payload_error(&self) -> Option<&PayloadError> {
        self.payload.as_ref().and_then(|payload| payload.error.as_ref())
    }
}

/// Build the context of one request.
///
/// The target url is the error url for error pages, then the island url, then
/// the raw request url. `force_no_ssr` is the process-wide override; either it
/// or the request header disables full rendering.
pub fn build_ssr_context(
    request: Arc<IncomingRequest>,
    response: ResponseHandle,
    runtime_config: &RuntimeConfig,
    force_no_ssr: bool,
    ssr_error: Option<PayloadError>,
    island_context: Option<IslandContext>,
) -> SsrContext {
    let url = ssr_error
        .as_ref()
        .and_then(|error| error.url.as_deref())
        .filter(|url| !url.is_empty())
        .or_else(|| island_context.as_ref().map(|island| island.url.as_str()))
        .unwrap_or_else(|| request.url())
        .to_string();

    SsrContext {
        url,
        no_ssr: force_no_ssr || request.wants_no_ssr(),
        error: ssr_error.is_some(),
        payload: ssr_error.map(Payload::with_error),
        request,
        response,
        runtime_config: runtime_config.clone(),
        island_context,
        styles: None,
        modules: BTreeSet::new(),
        render_meta: None,
    }
}
