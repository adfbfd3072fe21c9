//! Build output on disk: client manifest plus server bundle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use strata_core::ClientManifest;
use strata_renderer::{load_manifest_file, AssetSource, InitError, ServerEntry};
use strata_ssr_core::SsrPoolConfig;

use crate::entry::DenoServerEntry;
use crate::pool::SsrPool;

/// Loads the client manifest and boots an engine pool for the server bundle.
///
/// A missing file is reported as unavailable, not as an error, so the factory
/// can tell "not built" apart from "broken".
pub struct BundleAssetSource {
    manifest_path: PathBuf,
    bundle_path: PathBuf,
    pool_config: SsrPoolConfig,
    pool: Mutex<Option<Arc<SsrPool>>>,
}

impl BundleAssetSource {
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        bundle_path: impl Into<PathBuf>,
        pool_config: SsrPoolConfig,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            bundle_path: bundle_path.into(),
            pool_config,
            pool: Mutex::new(None),
        }
    }

    /// The engine pool, once the server bundle has been loaded.
    pub fn pool(&self) -> Option<Arc<SsrPool>> {
        self.pool.lock().expect("Lock poisoned").clone()
    }
}

#[async_trait]
impl AssetSource for BundleAssetSource {
    async fn load_manifest(&self) -> Result<Option<ClientManifest>, InitError> {
        load_manifest_file(&self.manifest_path).await
    }

    async fn load_server_entry(&self) -> Result<Option<Arc<dyn ServerEntry>>, InitError> {
        if let Some(pool) = self.pool() {
            return Ok(Some(Arc::new(DenoServerEntry::new(pool))));
        }

        if !tokio::fs::try_exists(&self.bundle_path)
            .await
            .unwrap_or(false)
        {
            tracing::warn!(path = %self.bundle_path.display(), "Server bundle not found");
            return Ok(None);
        }

        // Reading the bundle and spawning workers blocks
        let pool_config = self.pool_config.clone();
        let bundle_path = self.bundle_path.clone();
        let pool = tokio::task::spawn_blocking(move || SsrPool::new(pool_config, &bundle_path))
            .await
            .map_err(|e| bundle_load_error(e.to_string()))?
            .map_err(|e| bundle_load_error(e.to_string()))?;
        let pool = Arc::new(pool);
        *self.pool.lock().expect("Lock poisoned") = Some(Arc::clone(&pool));

        Ok(Some(Arc::new(DenoServerEntry::new(pool))))
    }
}

fn bundle_load_error(reason: String) -> InitError {
    InitError::Load {
        what: "server bundle".to_string(),
        reason,
    }
}
