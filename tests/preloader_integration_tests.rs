//! Integration tests for the ResourcePreloader
//!
//! These tests verify the batch-parallel, settle-all policy: a failing
//! resource never aborts a batch, requests are deduplicated by path, and
//! the cache answers consumers without re-reading files.

use camino::Utf8PathBuf;
use konami::models::{EffectDefinition, EffectHandler, HandlerHandle, OnClose, ResourceDescriptor, ResourceKind, TriggerContext};
use konami::registry::EffectRegistry;
use konami::services::ResourcePreloader;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n not a real image but signed like one";
const OGG_BYTES: &[u8] = b"OggS fake vorbis payload";

fn write_fixture(dir: &TempDir, name: &str, bytes: &[u8]) -> Utf8PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    Utf8PathBuf::from(path.to_str().unwrap())
}

#[tokio::test]
async fn test_one_failure_never_aborts_the_batch() {
    let dir = TempDir::new().unwrap();
    let good = write_fixture(&dir, "good.png", PNG_BYTES);
    let bad = Utf8PathBuf::from(dir.path().join("bad.png").to_str().unwrap());

    let preloader = ResourcePreloader::new();
    let status = preloader
        .preload_resources(&[
            ResourceDescriptor::new(ResourceKind::Image, bad.clone()),
            ResourceDescriptor::new(ResourceKind::Image, good.clone()),
        ])
        .await;

    assert!(status.is_complete);
    assert_eq!(status.total, 2);
    assert_eq!(status.loaded, 1);
    assert_eq!(status.failed, 1);
    assert_eq!(status.errors.len(), 1);
    assert_eq!(status.errors[0].path, bad);

    assert!(preloader.is_preloaded(&good));
    assert!(!preloader.is_preloaded(&bad));
}

#[tokio::test]
async fn test_wrong_container_counts_as_failure() {
    let dir = TempDir::new().unwrap();
    // Audio bytes declared as an image: readable but not decodable.
    let path = write_fixture(&dir, "oops.png", OGG_BYTES);

    let preloader = ResourcePreloader::new();
    let status = preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Image, path.clone())])
        .await;

    assert_eq!(status.failed, 1);
    assert!(status.errors[0].error.contains("Image"));
    assert!(!preloader.is_preloaded(&path));
}

#[tokio::test]
async fn test_loaded_resource_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "theme.ogg", OGG_BYTES);

    let preloader = ResourcePreloader::new();
    preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Audio, path.clone())])
        .await;

    let resource = preloader.get_preloaded_resource(&path).expect("cached");
    assert_eq!(resource.kind, ResourceKind::Audio);
    assert_eq!(resource.bytes, OGG_BYTES);

    // The file is gone; the cache still answers.
    fs::remove_file(path.as_std_path()).unwrap();
    assert!(preloader.is_preloaded(&path));

    let again = preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Audio, path.clone())])
        .await;
    assert_eq!(again.loaded, 1);
    assert_eq!(again.failed, 0);
}

#[tokio::test]
async fn test_concurrent_requests_for_one_path_dedup() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "shared.png", PNG_BYTES);

    let preloader = ResourcePreloader::new();

    // Two batches racing over the same path: both settle, one load.
    let batch_a = [ResourceDescriptor::new(ResourceKind::Image, path.clone())];
    let batch_b = [ResourceDescriptor::new(ResourceKind::Image, path.clone())];
    let a = preloader.preload_resources(&batch_a);
    let b = preloader.preload_resources(&batch_b);
    let (status_a, status_b) = tokio::join!(a, b);

    assert_eq!(status_a.loaded, 1);
    assert_eq!(status_b.loaded, 1);
    assert!(preloader.is_preloaded(&path));
}

#[tokio::test]
async fn test_cached_failure_settles_immediately() {
    let dir = TempDir::new().unwrap();
    let bad = Utf8PathBuf::from(dir.path().join("gone.png").to_str().unwrap());

    let preloader = ResourcePreloader::new();
    let first = preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Image, bad.clone())])
        .await;
    let second = preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Image, bad.clone())])
        .await;

    assert_eq!(first.failed, 1);
    assert_eq!(second.failed, 1);
    assert!(second.is_complete);
}

#[tokio::test]
async fn test_clear_forgets_everything() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "image.png", PNG_BYTES);

    let preloader = ResourcePreloader::new();
    preloader
        .preload_resources(&[ResourceDescriptor::new(ResourceKind::Image, path.clone())])
        .await;
    assert!(preloader.is_preloaded(&path));

    preloader.clear();

    assert!(!preloader.is_preloaded(&path));
    assert!(preloader.get_preloaded_resource(&path).is_none());
}

struct NoopHandler;

impl EffectHandler for NoopHandler {
    fn start(
        &self,
        _ctx: &TriggerContext,
        _on_close: OnClose,
        _resources: &[ResourceDescriptor],
    ) -> HandlerHandle {
        Box::new(())
    }

    fn stop(&self, _handle: HandlerHandle) {}
}

#[tokio::test]
async fn test_preload_all_sweeps_catalogue_and_skips_preload_false() {
    let dir = TempDir::new().unwrap();
    let wanted = write_fixture(&dir, "wanted.png", PNG_BYTES);
    let skipped = write_fixture(&dir, "skipped.ogg", OGG_BYTES);

    let mut registry = EffectRegistry::new();
    let mut effect = EffectDefinition::new("confetti");
    effect
        .resources
        .push(ResourceDescriptor::new(ResourceKind::Image, wanted.clone()));
    let mut lazy = ResourceDescriptor::new(ResourceKind::Audio, skipped.clone());
    lazy.preload = false;
    effect.resources.push(lazy);
    registry
        .register_effect(effect, Arc::new(NoopHandler))
        .unwrap();

    let preloader = ResourcePreloader::new();
    let status = preloader.preload_all(&registry).await;

    assert!(status.is_complete);
    assert_eq!(status.total, 1);
    assert_eq!(status.loaded, 1);
    assert!(preloader.is_preloaded(&wanted));
    assert!(!preloader.is_preloaded(&skipped));
    assert_eq!(preloader.progress(), 100);
}
