//! Loaders for the client manifest and the server bundle.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use strata_core::ClientManifest;

use crate::error::InitError;
use crate::renderer::ServerEntry;

/// Where renderers get their build artifacts from.
///
/// `Ok(None)` means the artifact does not exist; the factory turns that into
/// the matching [`InitError`] variant.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn load_manifest(&self) -> Result<Option<ClientManifest>, InitError>;

    async fn load_server_entry(&self) -> Result<Option<Arc<dyn ServerEntry>>, InitError>;
}

/// Artifacts held in memory, for embedding and tests.
#[derive(Default)]
pub struct StaticAssetSource {
    manifest: Option<ClientManifest>,
    entry: Option<Arc<dyn ServerEntry>>,
}

impl StaticAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, manifest: ClientManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn with_server_entry(mut self, entry: Arc<dyn ServerEntry>) -> Self {
        self.entry = Some(entry);
        self
    }
}

#[async_trait]
impl AssetSource for StaticAssetSource {
    async fn load_manifest(&self) -> Result<Option<ClientManifest>, InitError> {
        Ok(self.manifest.clone())
    }

    async fn load_server_entry(&self) -> Result<Option<Arc<dyn ServerEntry>>, InitError> {
        Ok(self.entry.clone())
    }
}

/// Read a client manifest from disk. A missing file is `Ok(None)`.
pub async fn load_manifest_file(path: &Path) -> Result<Option<ClientManifest>, InitError> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Client manifest not found");
            return Ok(None);
        }
        Err(e) => {
            return Err(InitError::Load {
                what: format!("client manifest {}", path.display()),
                reason: e.to_string(),
            })
        }
    };

    ClientManifest::from_json(&json)
        .map(Some)
        .map_err(|e| InitError::Load {
            what: format!("client manifest {}", path.display()),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_manifest_file() {
        let path = std::env::temp_dir().join("strata-missing-manifest-does-not-exist.json");
        let result = load_manifest_file(&path).await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_load_manifest_file() {
        let path = std::env::temp_dir().join(format!(
            "strata-manifest-{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, r#"{"entry.ts": {"file": "entry.js", "isEntry": true}}"#)
            .await
            .unwrap();

        let manifest = load_manifest_file(&path).await.unwrap().unwrap();
        assert_eq!(manifest.chunk("entry.ts").unwrap().file, "entry.js");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_invalid_manifest_file() {
        let path = std::env::temp_dir().join(format!(
            "strata-invalid-manifest-{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = load_manifest_file(&path).await;
        assert!(matches!(result, Err(InitError::Load { .. })));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticAssetSource::new().with_manifest(ClientManifest::default());
        assert!(source.load_manifest().await.unwrap().is_some());
        assert!(source.load_server_entry().await.unwrap().is_none());
    }
}
