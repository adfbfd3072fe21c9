//! Server render pipeline.
//!
//! This crate owns everything with state or I/O around the pure logic in
//! `strata_core`:
//! - [`RenderDispatcher`]: per-request orchestration (page, island, error page)
//! - [`RendererFactory`]: single-flight cache of the full and shell renderers
//! - [`SsrContext`]: the per-request rendering context
//! - [`ServerEntry`] / [`AssetSource`]: seams to the view engine and build output
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use http::Method;
//! use strata_core::{ClientManifest, RuntimeConfig};
//! use strata_renderer::{
//!     AppRender, FnServerEntry, IncomingRequest, RenderDispatcher, RendererFactory,
//!     ResponseHandle, SsrContext, StaticAssetSource,
//! };
//!
//! # async fn example() -> strata_renderer::Result<()> {
//! let entry = FnServerEntry::new(|ctx: &mut SsrContext| Ok(AppRender::new(format!("<p>{}</p>", ctx.url))));
//! let source = StaticAssetSource::new()
//!     .with_manifest(ClientManifest::default())
//!     .with_server_entry(Arc::new(entry));
//!
//! let config = Arc::new(RuntimeConfig::default());
//! let factory = Arc::new(RendererFactory::new(Arc::new(source), Arc::clone(&config)));
//! let dispatcher = RenderDispatcher::new(factory, config);
//!
//! let request = IncomingRequest::new(Method::GET, "/hello".parse().unwrap());
//! let response = dispatcher.render(request, ResponseHandle::new()).await?;
//! assert!(response.unwrap().body.contains("<p>/hello</p>"));
//! # Ok(())
//! # }
//! ```

mod context;
mod dispatcher;
mod error;
mod factory;
mod hooks;
mod renderer;
mod source;

pub use context::{
    build_ssr_context, IncomingRequest, RenderMetaFn, ResponseHandle, ResponseStatus, SsrContext,
    NO_SSR_HEADER,
};
pub use dispatcher::{RenderDispatcher, RenderResponse};
pub use error::{sanitize_error, DispatchError, InitError, RenderError, Result};
pub use factory::RendererFactory;
pub use hooks::HookRegistry;
pub use renderer::{
    AppRender, BundleRenderer, FnServerEntry, RenderMode, RenderedOutput, Renderer, ServerEntry,
    ShellRenderer, APP_ROOT_ID,
};
pub use source::{load_manifest_file, AssetSource, StaticAssetSource};
