use std::{env, path::PathBuf, time::Duration};

use serde_json::{Map, Value};
use strata_core::{AppConfig, RuntimeConfig};
use strata_ssr::DEFAULT_RENDER_TIMEOUT_MS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Serve the client shell for every request (default: false)
    pub no_ssr: bool,
    /// Client build manifest (default: ".output/client.manifest.json")
    pub manifest_path: PathBuf,
    /// Server bundle executed by the engine pool (default: ".output/server.js")
    pub server_bundle: PathBuf,
    /// Directory holding built client assets (default: ".output/public")
    pub public_dir: PathBuf,
    pub app: AppConfig,
    /// Public runtime config shipped to the client (default: {})
    pub public_config: Map<String, Value>,
    /// Engine worker threads (default: available parallelism)
    pub ssr_workers: usize,
    /// Engine render timeout in milliseconds (default: 10,000)
    pub ssr_timeout_ms: u64,
    /// NODE_ENV exposed to the server bundle (default: "production")
    pub node_env: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STRATA_NO_SSR` - Any non-empty value other than `0`/`false` disables SSR
    /// - `STRATA_MANIFEST_PATH` - Client manifest path
    /// - `STRATA_SERVER_BUNDLE` - Server bundle path
    /// - `STRATA_PUBLIC_DIR` - Client assets directory
    /// - `STRATA_BASE_URL` - Application base url (default: "/")
    /// - `STRATA_BUILD_ASSETS_DIR` - Assets directory under the base url (default: "/_strata/")
    /// - `STRATA_CDN_URL` - CDN origin for assets (default: none)
    /// - `STRATA_PUBLIC_CONFIG` - JSON object merged into the public runtime config
    /// - `SSR_WORKERS` - Engine worker count
    /// - `SSR_TIMEOUT_MS` - Engine render timeout
    /// - `NODE_ENV` - Environment name for the server bundle
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        Self {
            no_ssr: env::var("STRATA_NO_SSR")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            manifest_path: env::var("STRATA_MANIFEST_PATH")
                .unwrap_or_else(|_| ".output/client.manifest.json".to_string())
                .into(),
            server_bundle: env::var("STRATA_SERVER_BUNDLE")
                .unwrap_or_else(|_| ".output/server.js".to_string())
                .into(),
            public_dir: env::var("STRATA_PUBLIC_DIR")
                .unwrap_or_else(|_| ".output/public".to_string())
                .into(),
            app: AppConfig {
                base_url: env::var("STRATA_BASE_URL").unwrap_or(defaults.base_url),
                build_assets_dir: env::var("STRATA_BUILD_ASSETS_DIR")
                    .unwrap_or(defaults.build_assets_dir),
                cdn_url: env::var("STRATA_CDN_URL").unwrap_or(defaults.cdn_url),
            },
            public_config: env::var("STRATA_PUBLIC_CONFIG")
                .ok()
                .and_then(|v| serde_json::from_str(&v).ok())
                .unwrap_or_default(),
            ssr_workers: env::var("SSR_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    std::thread::available_parallelism()
                        .map(|p| p.get())
                        .unwrap_or(4)
                }),
            ssr_timeout_ms: env::var("SSR_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RENDER_TIMEOUT_MS),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "production".to_string()),
        }
    }

    /// Snapshot handed to every render.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            app: self.app.clone(),
            public: self.public_config.clone(),
            private: Map::new(),
        }
    }

    /// Directory the client assets are served from, relative to `public_dir`.
    pub fn assets_dir(&self) -> PathBuf {
        self.public_dir
            .join(self.app.build_assets_dir.trim_matches('/'))
    }

    /// Upper bound for one request: a page render plus its error-page render.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.ssr_timeout_ms.saturating_mul(2))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false")
}
