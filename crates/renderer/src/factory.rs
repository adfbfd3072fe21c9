//! Process-lifetime renderer cache.
//!
//! Each render mode owns a single-flight cell: the first caller starts the
//! initialization, every concurrent caller awaits that same future, a success
//! is kept for the life of the factory and a failure empties the cell so the
//! next caller starts over.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use strata_core::RuntimeConfig;

use crate::error::InitError;
use crate::renderer::{BundleRenderer, RenderMode, Renderer, ShellRenderer};
use crate::source::AssetSource;

type Flight<T> = Shared<BoxFuture<'static, Result<T, InitError>>>;

struct SingleFlight<T: Clone> {
    slot: Mutex<Option<Flight<T>>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    async fn get_or_init<F, Fut>(&self, init: F) -> Result<T, InitError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, InitError>> + Send + 'static,
    {
        let flight = {
            let mut slot = self.slot.lock().expect("Lock poisoned");
            match slot.as_ref() {
                Some(flight) => flight.clone(),
                None => {
                    let flight = init().boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let result = flight.clone().await;
        if result.is_err() {
            let mut slot = self.slot.lock().expect("Lock poisoned");
            // A retry may already have replaced the failed flight.
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
                *slot = None;
            }
        }
        result
    }
}

/// Builds and caches the full-render and shell renderers.
///
/// Owned by the composition root and shared by reference with the dispatcher.
pub struct RendererFactory {
    source: Arc<dyn AssetSource>,
    runtime_config: Arc<RuntimeConfig>,
    full: SingleFlight<Arc<dyn Renderer>>,
    shell: SingleFlight<Arc<dyn Renderer>>,
}

impl RendererFactory {
    pub fn new(source: Arc<dyn AssetSource>, runtime_config: Arc<RuntimeConfig>) -> Self {
        Self {
            source,
            runtime_config,
            full: SingleFlight::new(),
            shell: SingleFlight::new(),
        }
    }

    /// Get the renderer for `mode`, initializing it on first use.
    pub async fn acquire(&self, mode: RenderMode) -> Result<Arc<dyn Renderer>, InitError> {
        let source = Arc::clone(&self.source);
        match mode {
            RenderMode::FullSsr => self.full.get_or_init(move || init_full(source)).await,
            RenderMode::ShellOnly => {
                let config = Arc::clone(&self.runtime_config);
                self.shell
                    .get_or_init(move || init_shell(source, config))
                    .await
            }
        }
    }
}

async fn init_full(source: Arc<dyn AssetSource>) -> Result<Arc<dyn Renderer>, InitError> {
    let manifest = source
        .load_manifest()
        .await?
        .ok_or(InitError::ManifestUnavailable)?;
    let entry = source
        .load_server_entry()
        .await?
        .ok_or(InitError::ServerBundleUnavailable)?;

    tracing::info!(chunks = manifest.0.len(), "Server renderer initialized");
    Ok(Arc::new(BundleRenderer::new(manifest, entry)))
}

async fn init_shell(
    source: Arc<dyn AssetSource>,
    runtime_config: Arc<RuntimeConfig>,
) -> Result<Arc<dyn Renderer>, InitError> {
    let manifest = source
        .load_manifest()
        .await?
        .ok_or(InitError::ManifestUnavailable)?;

    tracing::info!(chunks = manifest.0.len(), "Shell renderer initialized");
    Ok(Arc::new(ShellRenderer::new(&manifest, &runtime_config.app)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use strata_core::ClientManifest;

    use crate::error::RenderError;
    use crate::renderer::{AppRender, FnServerEntry, ServerEntry};
    use crate::context::SsrContext;

    /// Counts loads; fails the first `failures` manifest loads.
    struct CountingSource {
        manifest_loads: AtomicUsize,
        entry_loads: AtomicUsize,
        failures: usize,
        has_entry: bool,
    }

    impl CountingSource {
        fn new(failures: usize, has_entry: bool) -> Self {
            Self {
                manifest_loads: AtomicUsize::new(0),
                entry_loads: AtomicUsize::new(0),
                failures,
                has_entry,
            }
        }
    }

    #[async_trait]
    impl AssetSource for CountingSource {
        async fn load_manifest(&self) -> Result<Option<ClientManifest>, InitError> {
            let attempt = self.manifest_loads.fetch_add(1, Ordering::SeqCst);
            // Keep the flight pending long enough for concurrent callers to join.
            tokio::time::sleep(Duration::from_millis(20)).await;
            if attempt < self.failures {
                return Ok(None);
            }
            Ok(Some(ClientManifest::default()))
        }

        async fn load_server_entry(&self) -> Result<Option<Arc<dyn ServerEntry>>, InitError> {
            self.entry_loads.fetch_add(1, Ordering::SeqCst);
            if !self.has_entry {
                return Ok(None);
            }
            let entry = FnServerEntry::new(|_: &mut SsrContext| -> Result<AppRender, RenderError> {
                Ok(AppRender::new("ok"))
            });
            Ok(Some(Arc::new(entry)))
        }
    }

    fn factory(source: Arc<CountingSource>) -> RendererFactory {
        RendererFactory::new(source, Arc::new(RuntimeConfig::default()))
    }

    #[tokio::test]
    async fn test_concurrent_acquire_initializes_once() {
        let source = Arc::new(CountingSource::new(0, true));
        let factory = factory(Arc::clone(&source));

        let (a, b, c) = tokio::join!(
            factory.acquire(RenderMode::FullSsr),
            factory.acquire(RenderMode::FullSsr),
            factory.acquire(RenderMode::FullSsr),
        );
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 1);
        assert_eq!(source.entry_loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test]
    async fn test_concurrent_acquire_across_tasks() {
        let source = Arc::new(CountingSource::new(0, true));
        let factory = Arc::new(factory(Arc::clone(&source)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let factory = Arc::clone(&factory);
                tokio::spawn(async move { factory.acquire(RenderMode::ShellOnly).await })
            })
            .collect();

        let mut renderers = Vec::new();
        for handle in handles {
            renderers.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 1);
        assert!(renderers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_success_is_cached() {
        let source = Arc::new(CountingSource::new(0, true));
        let factory = factory(Arc::clone(&source));

        let first = factory.acquire(RenderMode::FullSsr).await.unwrap();
        let second = factory.acquire(RenderMode::FullSsr).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let source = Arc::new(CountingSource::new(1, true));
        let factory = factory(Arc::clone(&source));

        let first = factory.acquire(RenderMode::FullSsr).await;
        assert_eq!(first.err(), Some(InitError::ManifestUnavailable));

        let second = factory.acquire(RenderMode::FullSsr).await;
        assert!(second.is_ok());
        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_failure() {
        let source = Arc::new(CountingSource::new(1, true));
        let factory = factory(Arc::clone(&source));

        let (a, b) = tokio::join!(
            factory.acquire(RenderMode::FullSsr),
            factory.acquire(RenderMode::FullSsr),
        );

        assert_eq!(a.err(), Some(InitError::ManifestUnavailable));
        assert_eq!(b.err(), Some(InitError::ManifestUnavailable));
        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_requires_server_bundle() {
        let source = Arc::new(CountingSource::new(0, false));
        let factory = factory(Arc::clone(&source));

        let result = factory.acquire(RenderMode::FullSsr).await;
        assert_eq!(result.err(), Some(InitError::ServerBundleUnavailable));
    }

    #[tokio::test]
    async fn test_shell_needs_only_manifest() {
        let source = Arc::new(CountingSource::new(0, false));
        let factory = factory(Arc::clone(&source));

        assert!(factory.acquire(RenderMode::ShellOnly).await.is_ok());
        assert_eq!(source.entry_loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_modes_are_cached_independently() {
        let source = Arc::new(CountingSource::new(0, true));
        let factory = factory(Arc::clone(&source));

        let full = factory.acquire(RenderMode::FullSsr).await.unwrap();
        let shell = factory.acquire(RenderMode::ShellOnly).await.unwrap();

        assert!(!Arc::ptr_eq(&full, &shell));
        assert_eq!(source.manifest_loads.load(Ordering::SeqCst), 2);
    }
}
