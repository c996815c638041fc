//! E2E Test: PWA Page Storage and Demo Flow
//!
//! Tests what the demo page keeps across reloads and how its buttons
//! behave once the network is gone:
//! 1. Save a timestamp, reload, see it again
//! 2. Cache test online and offline
//! 3. Status lines for unsupported platforms

use pwa_lab_browser::pwa::{DemoPage, KeyValueStore, PlatformFeatures, LAST_SAVED_KEY};
use pwa_lab_e2e_tests::*;
use pwa_lab_runtime::service_worker::WorkerConfig;

#[test]
fn test_saved_timestamp_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pwa-lab").join("kv.json");

    let saved = {
        let store = KeyValueStore::open(&path).unwrap();
        let mut page = DemoPage::new(ORIGIN, "/", PlatformFeatures::all(), pwa_site(), Some(store));
        assert!(page.status().storage.is_none());
        page.save_timestamp();
        page.status().storage.clone().unwrap()
    };
    let ts = saved.strip_prefix("Saved: ").unwrap().to_string();

    let store = KeyValueStore::open(&path).unwrap();
    assert_eq!(store.get(LAST_SAVED_KEY), Some(ts.as_str()));
    let page = DemoPage::new(ORIGIN, "/", PlatformFeatures::all(), pwa_site(), Some(store));
    assert_eq!(page.status().storage, Some(format!("Last: {}", ts)));
}

#[test]
fn test_saved_timestamp_is_rfc3339() {
    let mut store = KeyValueStore::in_memory();
    let status = store.save_status();
    let raw = store.get(LAST_SAVED_KEY).unwrap();
    assert_eq!(status, format!("Saved: {}", raw));
    assert!(raw.contains('T') && raw.ends_with('Z'));
    assert!(store.last_saved().unwrap().is_some());
}

#[tokio::test]
async fn test_demo_page_cache_test_offline() {
    let site = pwa_site();
    let mut page = DemoPage::new(
        ORIGIN,
        "/",
        PlatformFeatures::all(),
        site.clone(),
        Some(KeyValueStore::in_memory()),
    );
    page.register_service_worker(WorkerConfig::default()).await;
    assert!(page.status().install.is_none());

    page.test_cache().await;
    let expected = format!("OK: {}", SAMPLE_MESSAGE);
    assert_eq!(page.status().cache_test.as_deref(), Some(expected.as_str()));
    page.container().settle().await;

    site.set_offline(true);
    page.test_cache().await;
    assert_eq!(page.status().cache_test.as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_demo_page_without_worker_support() {
    let site = pwa_site();
    let features = PlatformFeatures::all() - PlatformFeatures::SERVICE_WORKER;
    let mut page = DemoPage::new(ORIGIN, "/", features, site.clone(), None);
    page.register_service_worker(WorkerConfig::default()).await;
    assert_eq!(
        page.status().install.as_deref(),
        Some("Service Worker not supported.")
    );
    assert!(page.container().caches().keys().is_empty());

    site.set_offline(true);
    page.test_cache().await;
    assert_eq!(
        page.status().cache_test.as_deref(),
        Some("Offline or resource unavailable.")
    );
}

#[tokio::test]
async fn test_invalid_update_is_reported() {
    let site = pwa_site();
    let mut page = DemoPage::new(ORIGIN, "/", PlatformFeatures::all(), site, None);
    page.register_service_worker(WorkerConfig::default()).await;

    // invalid config is reported, the active worker stays
    let mut broken = WorkerConfig::with_version("pwa-lab-v2");
    broken.offline_path = "offline.html".to_string();
    page.register_service_worker(broken).await;
    assert!(page.status().install.as_deref().unwrap().starts_with("SW error: "));
    assert_eq!(
        page.container().controller().unwrap().config().cache_version,
        "pwa-lab-v1"
    );
}
