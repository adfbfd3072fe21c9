//! Renderer variants and the view-engine seam.
//!
//! - [`ServerEntry`] is the application's server bundle: it turns a context
//!   into markup and may mutate the context (payload, styles, metadata).
//! - [`Renderer`] wraps an entry (or nothing, for the shell) with the client
//!   manifest and produces a [`RenderedOutput`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use strata_core::{AppConfig, ClientManifest, Payload, RenderedAssets, RenderedMeta};

use crate::context::SsrContext;
use crate::error::RenderError;

/// Id of the element the application mounts into.
pub const APP_ROOT_ID: &str = "__strata";

/// Rendering strategy of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Full server render of the component tree.
    FullSsr,
    /// Static client shell; the browser renders everything.
    ShellOnly,
}

impl RenderMode {
    pub fn for_context(ctx: &SsrContext) -> Self {
        if ctx.no_ssr {
            Self::ShellOnly
        } else {
            Self::FullSsr
        }
    }
}

/// Markup produced by the application's server bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRender {
    pub html: String,
    /// Markup the application placed into named slots.
    pub teleports: BTreeMap<String, String>,
}

impl AppRender {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            teleports: BTreeMap::new(),
        }
    }

    pub fn with_teleport(mut self, name: impl Into<String>, html: impl Into<String>) -> Self {
        self.teleports.insert(name.into(), html.into());
        self
    }
}

/// The application's server bundle.
#[async_trait]
pub trait ServerEntry: Send + Sync {
    async fn render(&self, ctx: &mut SsrContext) -> Result<AppRender, RenderError>;
}

/// A [`ServerEntry`] backed by a plain Rust function.
pub struct FnServerEntry<F>(F);

impl<F> FnServerEntry<F>
where
    F: Fn(&mut SsrContext) -> Result<AppRender, RenderError> + Send + Sync,
{
    pub fn new(render: F) -> Self {
        Self(render)
    }
}

#[async_trait]
impl<F> ServerEntry for FnServerEntry<F>
where
    F: Fn(&mut SsrContext) -> Result<AppRender, RenderError> + Send + Sync,
{
    async fn render(&self, ctx: &mut SsrContext) -> Result<AppRender, RenderError> {
        (self.0)(ctx)
    }
}

type FragmentProducer = Box<dyn FnOnce() -> String + Send>;

/// Output of one renderer invocation.
///
/// Asset fragments are produced lazily, at most once each.
pub struct RenderedOutput {
    pub html: String,
    pub teleports: BTreeMap<String, String>,
    resource_hints: Option<FragmentProducer>,
    styles: Option<FragmentProducer>,
    scripts: Option<FragmentProducer>,
}

impl RenderedOutput {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            teleports: BTreeMap::new(),
            resource_hints: None,
            styles: None,
            scripts: None,
        }
    }

    pub fn with_teleports(mut self, teleports: BTreeMap<String, String>) -> Self {
        self.teleports = teleports;
        self
    }

    pub fn with_resource_hints(mut self, produce: impl FnOnce() -> String + Send + 'static) -> Self {
        self.resource_hints = Some(Box::new(produce));
        self
    }

    pub fn with_styles(mut self, produce: impl FnOnce() -> String + Send + 'static) -> Self {
        self.styles = Some(Box::new(produce));
        self
    }

    pub fn with_scripts(mut self, produce: impl FnOnce() -> String + Send + 'static) -> Self {
        self.scripts = Some(Box::new(produce));
        self
    }

    pub fn render_resource_hints(&mut self) -> Option<String> {
        self.resource_hints.take().map(|produce| produce())
    }

    pub fn render_styles(&mut self) -> Option<String> {
        self.styles.take().map(|produce| produce())
    }

    pub fn render_scripts(&mut self) -> Option<String> {
        self.scripts.take().map(|produce| produce())
    }

    pub fn teleport(&self, name: &str) -> Option<&str> {
        self.teleports.get(name).map(String::as_str)
    }
}

impl fmt::Debug for RenderedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedOutput")
            .field("html", &self.html)
            .field("teleports", &self.teleports)
            .finish_non_exhaustive()
    }
}

/// A renderer variant produced by the factory.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render_to_string(&self, ctx: &mut SsrContext) -> Result<RenderedOutput, RenderError>;
}

/// Asset fragments computed on first use and shared by the three producers.
struct LazyAssets {
    manifest: Arc<ClientManifest>,
    app: AppConfig,
    modules: BTreeSet<String>,
    rendered: OnceLock<RenderedAssets>,
}

impl LazyAssets {
    fn get(&self) -> &RenderedAssets {
        self.rendered
            .get_or_init(|| self.manifest.render_assets(&self.app, &self.modules))
    }
}

/// Full server renderer: runs the server bundle for every request.
pub struct BundleRenderer {
    manifest: Arc<ClientManifest>,
    entry: Arc<dyn ServerEntry>,
}

impl BundleRenderer {
    pub fn new(manifest: ClientManifest, entry: Arc<dyn ServerEntry>) -> Self {
        Self {
            manifest: Arc::new(manifest),
            entry,
        }
    }
}

#[async_trait]
impl Renderer for BundleRenderer {
    async fn render_to_string(&self, ctx: &mut SsrContext) -> Result<RenderedOutput, RenderError> {
        let AppRender { html, teleports } = self.entry.render(ctx).await?;

        let assets = Arc::new(LazyAssets {
            manifest: Arc::clone(&self.manifest),
            app: ctx.runtime_config.app.clone(),
            modules: ctx.modules.clone(),
            rendered: OnceLock::new(),
        });
        let hints = Arc::clone(&assets);
        let styles = Arc::clone(&assets);

        Ok(
            RenderedOutput::new(format!(r#"<div id="{APP_ROOT_ID}">{html}</div>"#))
                .with_teleports(teleports)
                .with_resource_hints(move || hints.get().resource_hints.clone())
                .with_styles(move || styles.get().styles.clone())
                .with_scripts(move || assets.get().scripts.clone()),
        )
    }
}

/// Client-shell renderer.
///
/// The shell markup and its asset fragments are computed once, when the
/// renderer is built, and hold no per-request data. Request state reaches the
/// client through the payload written into each context.
pub struct ShellRenderer {
    html: String,
    assets: Arc<RenderedAssets>,
}

impl ShellRenderer {
    pub fn new(manifest: &ClientManifest, app: &AppConfig) -> Self {
        Self {
            html: format!(r#"<div id="{APP_ROOT_ID}"></div>"#),
            assets: Arc::new(manifest.render_assets(app, &BTreeSet::new())),
        }
    }

    /// The cached shell markup.
    pub fn shell_html(&self) -> &str {
        &self.html
    }
}

#[async_trait]
impl Renderer for ShellRenderer {
    async fn render_to_string(&self, ctx: &mut SsrContext) -> Result<RenderedOutput, RenderError> {
        ctx.payload = Some(Payload {
            server_rendered: Some(false),
            config: Some(ctx.runtime_config.client_config()),
            ..Default::default()
        });
        if !ctx.has_render_meta() {
            ctx.set_render_meta(|| std::future::ready(RenderedMeta::default()));
        }

        let hints = Arc::clone(&self.assets);
        let styles = Arc::clone(&self.assets);
        let scripts = Arc::clone(&self.assets);
        Ok(RenderedOutput::new(self.html.clone())
            .with_resource_hints(move || hints.resource_hints.clone())
            .with_styles(move || styles.styles.clone())
            .with_scripts(move || scripts.scripts.clone()))
    }
}
