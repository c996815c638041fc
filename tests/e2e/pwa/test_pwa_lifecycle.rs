//! E2E Test: Service Worker Lifecycle
//!
//! Tests the install → activate → update sequence:
//! 1. Install pre-caches every core asset, all or nothing
//! 2. Activation leaves exactly one cache generation
//! 3. Open pages are claimed without a reload
//! 4. An update replaces the old generation

use std::sync::Arc;

use pwa_lab_e2e_tests::*;
use pwa_lab_runtime::service_worker::{
    EventHandler, ExtendableEvent, LifecycleEvent, ServiceWorker, ServiceWorkerContainer,
    ServiceWorkerError, ServiceWorkerState, StaticNetwork, WorkerConfig, WorkerGlobalScope,
    DEFAULT_CORE_ASSETS,
};

#[tokio::test]
async fn test_install_caches_every_core_asset() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    assert_cached(container.caches(), "pwa-lab-v1", DEFAULT_CORE_ASSETS.iter().copied()).unwrap();
    for asset in DEFAULT_CORE_ASSETS {
        assert!(site.hits(asset) >= 1, "{} never fetched", asset);
    }
}

#[tokio::test]
async fn test_activation_leaves_single_generation() {
    let site = pwa_site();
    let mut container = ServiceWorkerContainer::new(ORIGIN, site.clone());
    // leftovers from earlier deployments
    container.caches().open("pwa-lab-v0");
    container.caches().open("some-other-cache");

    container.register(WorkerConfig::default()).await.unwrap();
    assert_generations(container.caches(), &["pwa-lab-v1"]).unwrap();
}

#[tokio::test]
async fn test_install_is_all_or_nothing() {
    let site = pwa_site();
    site.fail_path("/assets/icons/icon-512.svg");
    let mut container = ServiceWorkerContainer::new(ORIGIN, site.clone());

    let err = container.register(WorkerConfig::default()).await.unwrap_err();
    assert!(matches!(err, ServiceWorkerError::InstallFailed(_)));
    assert!(container.controller().is_none());
    let partial = container.caches().open("pwa-lab-v1");
    assert!(partial.is_empty());
}

#[tokio::test]
async fn test_missing_asset_fails_install() {
    let site = Arc::new(StaticNetwork::new());
    // only the shell; the rest answers 404
    site.route("/", SiteFixtures::index_page());
    let mut container = ServiceWorkerContainer::new(ORIGIN, site.clone());
    assert!(container.register(WorkerConfig::default()).await.is_err());
}

#[tokio::test]
async fn test_open_pages_are_claimed() {
    let site = pwa_site();
    let mut container = ServiceWorkerContainer::new(ORIGIN, site.clone());
    let before = container.open_page("/");
    assert!(container.clients().get(before).unwrap().controller.is_none());

    container.register(WorkerConfig::default()).await.unwrap();
    let worker = container.controller().unwrap().id();
    assert_eq!(container.clients().get(before).unwrap().controller, Some(worker));

    let after = container.open_page("/index.html");
    assert_eq!(container.clients().get(after).unwrap().controller, Some(worker));
}

#[tokio::test]
async fn test_update_replaces_generation() {
    let site = pwa_site();
    let mut container = registered(&site, WorkerConfig::with_version("pwa-lab-v1")).await;
    let page = container.open_page("/");
    let old = container.controller().unwrap().id();

    container
        .register(WorkerConfig::with_version("pwa-lab-v2"))
        .await
        .unwrap();
    let new = container.controller().unwrap();
    assert_ne!(new.id(), old);
    assert_eq!(new.state(), ServiceWorkerState::Activated);
    assert_generations(container.caches(), &["pwa-lab-v2"]).unwrap();
    assert_cached(container.caches(), "pwa-lab-v2", DEFAULT_CORE_ASSETS.iter().copied()).unwrap();
    assert_eq!(container.clients().get(page).unwrap().controller, Some(new.id()));
}

#[tokio::test]
async fn test_worker_records_state_changes() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    let worker = container.controller().unwrap();
    let states: Vec<ServiceWorkerState> = worker
        .lifecycle_events()
        .iter()
        .filter_map(|e| match e {
            LifecycleEvent::StateChange(change) => Some(change.new_state),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            ServiceWorkerState::Installing,
            ServiceWorkerState::Installed,
            ServiceWorkerState::Activating,
            ServiceWorkerState::Activated,
        ]
    );
}

/// Installs without asking to skip waiting.
struct PatientWorker;

impl EventHandler for PatientWorker {
    fn on_install(&self, _event: &mut ExtendableEvent) {}
}

#[tokio::test]
async fn test_worker_without_skip_waiting_stays_installed() {
    let site = pwa_site();
    let scope = WorkerGlobalScope::new(
        WorkerConfig::default(),
        Arc::new(Default::default()),
        site.clone(),
        Default::default(),
    );
    let mut worker = ServiceWorker::with_handler(scope, Arc::new(PatientWorker));
    worker.install().await.unwrap();
    assert!(worker.is_waiting());
    assert!(!worker.skip_waiting_requested());
    assert!(matches!(
        worker.fetch(pwa_lab_runtime::Request::new("/")).await,
        Err(ServiceWorkerError::NotActive)
    ));
}
