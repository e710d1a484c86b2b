use crate::models::{ResourceDescriptor, ResourceKind};
use crate::registry::EffectRegistry;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinSet;

/// A media resource held in the preload cache, ready for a handler to
/// play without touching the filesystem.
#[derive(Debug)]
pub struct LoadedResource {
    pub kind: ResourceKind,
    pub bytes: Vec<u8>,
}

/// One resource that failed to preload.
#[derive(Debug, Clone)]
pub struct PreloadFailure {
    pub path: Utf8PathBuf,
    pub kind: ResourceKind,
    pub error: String,
}

/// Aggregate outcome of a preload batch. Rebuilt fresh for every batch,
/// never persisted.
#[derive(Debug, Clone, Default)]
pub struct PreloadStatus {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,

    /// Set only after every resource in the batch has settled.
    pub is_complete: bool,

    pub errors: Vec<PreloadFailure>,
}

enum CacheEntry {
    /// A load for this path is running; subscribers wait on the channel.
    InFlight(watch::Receiver<Option<Result<(), String>>>),
    Loaded(Arc<LoadedResource>),
    Failed(String),
}

/// Background loader and cache for effect media.
///
/// Resources are a visual nicety, not a correctness dependency: a missing
/// confetti sound must not block the rest of the site. Every entry point
/// therefore settles rather than aborts — individual failures land in
/// [`PreloadStatus::errors`] and the affected path is simply absent from
/// the cache.
///
/// Requests are deduplicated by path: a second request for a path already
/// in flight waits on the existing load, and a settled path (loaded or
/// failed) answers immediately from the cache.
///
/// The cache is owned exclusively by this type; consumers read through
/// [`is_preloaded`](Self::is_preloaded) and
/// [`get_preloaded_resource`](Self::get_preloaded_resource).
#[derive(Clone)]
pub struct ResourcePreloader {
    cache: Arc<RwLock<HashMap<Utf8PathBuf, CacheEntry>>>,

    /// Progress counters for the current batch, reset when a batch starts.
    batch_total: Arc<AtomicUsize>,
    batch_settled: Arc<AtomicUsize>,
}

impl ResourcePreloader {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            batch_total: Arc::new(AtomicUsize::new(0)),
            batch_settled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Preload a batch of resources in parallel.
    ///
    /// Resources with `preload == false` are skipped entirely: neither
    /// counted nor fetched. The rest all start at once and the batch is
    /// awaited settle-all; one failure never aborts the others and this
    /// call never returns an error.
    pub async fn preload_resources(&self, resources: &[ResourceDescriptor]) -> PreloadStatus {
        let batch: Vec<ResourceDescriptor> =
            resources.iter().filter(|r| r.preload).cloned().collect();

        let mut status = PreloadStatus {
            total: batch.len(),
            ..Default::default()
        };

        self.batch_total.store(batch.len(), Ordering::Relaxed);
        self.batch_settled.store(0, Ordering::Relaxed);

        if batch.is_empty() {
            status.is_complete = true;
            return status;
        }

        tracing::debug!("Preloading {} resources", batch.len());

        let mut tasks = JoinSet::new();
        for resource in batch {
            let preloader = self.clone();
            tasks.spawn(async move {
                let outcome = preloader.load_one(&resource).await;
                (resource, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            self.batch_settled.fetch_add(1, Ordering::Relaxed);

            match joined {
                Ok((_, Ok(()))) => status.loaded += 1,
                Ok((resource, Err(error))) => {
                    tracing::warn!("Failed to preload {}: {}", resource.path, error);
                    status.failed += 1;
                    status.errors.push(PreloadFailure {
                        path: resource.path,
                        kind: resource.kind,
                        error,
                    });
                }
                Err(join_error) => {
                    // A panicked load task settles as a failure like any other.
                    tracing::warn!("Preload task aborted: {}", join_error);
                    status.failed += 1;
                    status.errors.push(PreloadFailure {
                        path: Utf8PathBuf::new(),
                        kind: ResourceKind::Image,
                        error: join_error.to_string(),
                    });
                }
            }
        }

        status.is_complete = true;
        tracing::info!(
            "Preload batch complete: {} loaded, {} failed of {}",
            status.loaded,
            status.failed,
            status.total
        );
        status
    }

    /// Preload every resource referenced by the effect catalogue.
    pub async fn preload_all(&self, registry: &EffectRegistry) -> PreloadStatus {
        self.preload_resources(&registry.all_resources()).await
    }

    /// Whether a path has been successfully preloaded.
    pub fn is_preloaded(&self, path: &Utf8Path) -> bool {
        matches!(
            self.cache.read().unwrap().get(path),
            Some(CacheEntry::Loaded(_))
        )
    }

    /// Fetch a preloaded resource from the cache.
    pub fn get_preloaded_resource(&self, path: &Utf8Path) -> Option<Arc<LoadedResource>> {
        match self.cache.read().unwrap().get(path) {
            Some(CacheEntry::Loaded(resource)) => Some(Arc::clone(resource)),
            _ => None,
        }
    }

    /// Progress of the current batch as 0..=100; 100 when no batch has
    /// run or the last batch finished.
    pub fn progress(&self) -> u8 {
        let total = self.batch_total.load(Ordering::Relaxed);
        if total == 0 {
            return 100;
        }
        let settled = self.batch_settled.load(Ordering::Relaxed).min(total);
        ((settled * 100) / total) as u8
    }

    /// Drop every cached resource and cached failure.
    pub fn clear(&self) {
        self.cache.write().unwrap().clear();
        tracing::debug!("Preload cache cleared");
    }

    /// Load a single resource, deduplicating against the cache.
    ///
    /// The cache lock is never held across an await: the decision to
    /// load, wait, or answer from cache is made in one synchronous
    /// critical section.
    async fn load_one(&self, resource: &ResourceDescriptor) -> Result<(), String> {
        enum Decision {
            Settled(Result<(), String>),
            Wait(watch::Receiver<Option<Result<(), String>>>),
            Load(watch::Sender<Option<Result<(), String>>>),
        }

        let decision = {
            let mut cache = self.cache.write().unwrap();
            match cache.get(&resource.path) {
                Some(CacheEntry::Loaded(_)) => Decision::Settled(Ok(())),
                Some(CacheEntry::Failed(error)) => Decision::Settled(Err(error.clone())),
                Some(CacheEntry::InFlight(rx)) => Decision::Wait(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    cache.insert(resource.path.clone(), CacheEntry::InFlight(rx));
                    Decision::Load(tx)
                }
            }
        };

        match decision {
            Decision::Settled(outcome) => outcome,
            Decision::Load(tx) => self.fetch_and_publish(resource, tx).await,
            // Another task owns the load; wait for it to settle.
            Decision::Wait(mut rx) => loop {
                if let Some(outcome) = rx.borrow_and_update().clone() {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    return Err("preload task dropped before settling".to_string());
                }
            },
        }
    }

    async fn fetch_and_publish(
        &self,
        resource: &ResourceDescriptor,
        tx: watch::Sender<Option<Result<(), String>>>,
    ) -> Result<(), String> {
        let outcome = fetch_and_decode(resource).await;

        let settled = match &outcome {
            Ok(bytes) => {
                let loaded = Arc::new(LoadedResource {
                    kind: resource.kind,
                    bytes: bytes.clone(),
                });
                tracing::debug!("Preloaded {} ({} bytes)", resource.path, loaded.bytes.len());
                self.cache
                    .write()
                    .unwrap()
                    .insert(resource.path.clone(), CacheEntry::Loaded(loaded));
                Ok(())
            }
            Err(error) => {
                self.cache
                    .write()
                    .unwrap()
                    .insert(resource.path.clone(), CacheEntry::Failed(error.clone()));
                Err(error.clone())
            }
        };

        // Waiters see the settled result; send errors just mean nobody waited.
        let _ = tx.send(Some(settled.clone()));
        settled
    }
}

impl Default for ResourcePreloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the file and verify it is recognisably the declared kind of
/// media. This is the crate's stand-in for the browser's
/// can-play-through / decode-complete readiness signals.
async fn fetch_and_decode(resource: &ResourceDescriptor) -> Result<Vec<u8>, String> {
    let bytes = tokio::fs::read(resource.path.as_std_path())
        .await
        .map_err(|e| format!("read failed: {e}"))?;

    validate_signature(resource.kind, &bytes)?;
    Ok(bytes)
}

fn validate_signature(kind: ResourceKind, bytes: &[u8]) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("file is empty".to_string());
    }

    let ok = match kind {
        ResourceKind::Image => {
            bytes.starts_with(b"\x89PNG")
                || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
                || bytes.starts_with(b"GIF8")
                || (bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP"))
        }
        ResourceKind::Audio => {
            (bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WAVE"))
                || bytes.starts_with(b"ID3")
                || bytes.starts_with(b"OggS")
                || bytes.starts_with(b"fLaC")
                || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
        }
        ResourceKind::Video => {
            bytes.get(4..8) == Some(b"ftyp")
                || bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3])
                || bytes.starts_with(b"OggS")
        }
    };

    if ok {
        Ok(())
    } else {
        Err(format!("not a recognised {kind:?} container"))
    }
}
