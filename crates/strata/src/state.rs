//! Shared application state passed to all request handlers.

use std::{path::PathBuf, sync::Arc, time::Duration};

use strata_renderer::{RenderDispatcher, RendererFactory};
use strata_ssr::{BundleAssetSource, SsrPool, SsrPoolConfig, DEFAULT_MAX_PENDING};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RenderDispatcher>,
    /// Directory the client assets route reads from.
    pub assets_dir: Arc<PathBuf>,
    /// Url path the client assets are mounted under, e.g. `/_strata`.
    pub assets_route: Arc<str>,
    pub request_timeout: Duration,
    /// Every request is served the client shell.
    pub no_ssr: bool,
    /// Build output loader; holds the engine pool once it has booted.
    bundle: Option<Arc<BundleAssetSource>>,
}

impl AppState {
    /// Wire the render pipeline from configuration.
    ///
    /// Nothing is loaded here: the manifest and server bundle are read on the
    /// first request that needs them.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let pool_config = SsrPoolConfig::new(
            config.ssr_workers,
            DEFAULT_MAX_PENDING,
            config.ssr_timeout_ms,
            config.node_env.as_str(),
        )?;

        let bundle = Arc::new(BundleAssetSource::new(
            &config.manifest_path,
            &config.server_bundle,
            pool_config,
        ));
        let runtime_config = Arc::new(config.runtime_config());
        let factory = Arc::new(RendererFactory::new(
            bundle.clone(),
            Arc::clone(&runtime_config),
        ));
        let dispatcher = RenderDispatcher::new(factory, runtime_config).force_no_ssr(config.no_ssr);

        tracing::info!(
            manifest = %config.manifest_path.display(),
            bundle = %config.server_bundle.display(),
            workers = config.ssr_workers,
            no_ssr = config.no_ssr,
            "Render pipeline configured"
        );

        Ok(Self {
            bundle: Some(bundle),
            ..Self::with_dispatcher(dispatcher, config)
        })
    }

    /// State around an already-built dispatcher, without an engine pool.
    pub fn with_dispatcher(dispatcher: RenderDispatcher, config: &Config) -> Self {
        let assets_route = format!("/{}", config.app.build_assets_dir.trim_matches('/'));
        Self {
            dispatcher: Arc::new(dispatcher),
            assets_dir: Arc::new(config.assets_dir()),
            assets_route: assets_route.into(),
            request_timeout: config.request_timeout(),
            no_ssr: config.no_ssr,
            bundle: None,
        }
    }

    /// The engine pool, if the server bundle has been loaded.
    pub fn ssr_pool(&self) -> Option<Arc<SsrPool>> {
        self.bundle.as_ref().and_then(|bundle| bundle.pool())
    }
}
