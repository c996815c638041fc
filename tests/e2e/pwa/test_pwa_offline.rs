//! E2E Test: PWA Offline Capability
//!
//! Tests that the worker keeps the app usable without a network:
//! 1. Register the worker (core assets pre-cached)
//! 2. Browse online (navigations written through)
//! 3. Drop the network
//! 4. Verify cached resources and the offline page are served

use pwa_lab_e2e_tests::*;
use pwa_lab_runtime::service_worker::{
    FetchError, FetchResult, FetchSource, Request, RequestMethod, WorkerConfig,
};

#[tokio::test]
async fn test_offline_navigation_falls_back_to_offline_page() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    site.set_offline(true);

    let worker = container.controller().unwrap();
    let first = worker.fetch(Request::navigate("/never-visited")).await.unwrap();
    let body = assert_served_from(&first, FetchSource::Fallback).unwrap();
    assert_eq!(body, SiteFixtures::offline_page());

    // repeated offline navigations give the same page
    let second = worker.fetch(Request::navigate("/never-visited")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_visited_page_served_from_cache_offline() {
    let site = pwa_site();
    site.route("/about", "<h1>About</h1>");
    let container = registered(&site, WorkerConfig::default()).await;

    let online = container.fetch(Request::navigate("/about")).await.unwrap();
    assert_eq!(online.text(), "<h1>About</h1>");

    site.set_offline(true);
    let worker = container.controller().unwrap();
    let offline = worker.fetch(Request::navigate("/about")).await.unwrap();
    assert_eq!(
        assert_served_from(&offline, FetchSource::Cache).unwrap(),
        "<h1>About</h1>"
    );
}

#[tokio::test]
async fn test_navigation_prefers_network_when_online() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    site.route("/", "<h1>New shell</h1>");

    let worker = container.controller().unwrap();
    let result = worker.fetch(Request::navigate("/")).await.unwrap();
    assert_eq!(
        assert_served_from(&result, FetchSource::Network).unwrap(),
        "<h1>New shell</h1>"
    );
    // written through for the next offline visit
    let cached = container.caches().open("pwa-lab-v1").match_url("/").unwrap();
    assert_eq!(cached.text(), "<h1>New shell</h1>");
}

#[tokio::test]
async fn test_sample_data_offline() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;

    let online = container.fetch(Request::new("/data/sample.json")).await.unwrap();
    let data: serde_json::Value = online.json().unwrap();
    assert_eq!(data["message"], SAMPLE_MESSAGE);
    container.settle().await;

    site.set_offline(true);
    let offline = container.fetch(Request::new("/data/sample.json")).await.unwrap();
    let data: serde_json::Value = offline.json().unwrap();
    assert_eq!(data["message"], SAMPLE_MESSAGE);
}

#[tokio::test]
async fn test_stale_while_revalidate_refreshes_in_background() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    site.route("/data/sample.json", SiteFixtures::sample_data("fresh"));

    let worker = container.controller().unwrap();
    let stale = worker.fetch(Request::new("/data/sample.json")).await.unwrap();
    let body = assert_served_from(&stale, FetchSource::Cache).unwrap();
    assert!(body.contains(SAMPLE_MESSAGE));

    container.settle().await;
    let refreshed = worker.fetch(Request::new("/data/sample.json")).await.unwrap();
    let body = assert_served_from(&refreshed, FetchSource::Cache).unwrap();
    assert!(body.contains("fresh"));
}

#[tokio::test]
async fn test_uncached_subresource_offline_has_no_response() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    site.set_offline(true);

    let worker = container.controller().unwrap();
    let result = worker.fetch(Request::new("/assets/photo.png")).await.unwrap();
    assert_eq!(result, FetchResult::NoResponse);

    let err = container.fetch(Request::new("/assets/photo.png")).await.unwrap_err();
    assert!(matches!(err, FetchError::NoResponse(_)));
}

#[tokio::test]
async fn test_non_get_requests_bypass_cache() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    let before = container.caches().stats();
    let entries_before = container.caches().open("pwa-lab-v1").len();

    let worker = container.controller().unwrap();
    let request = Request::new("/index.html")
        .with_method(RequestMethod::Post)
        .with_body("note");
    assert_eq!(worker.fetch(request.clone()).await.unwrap(), FetchResult::Passthrough);

    // answered by the static origin itself, not by a cached copy
    let response = container.fetch(request).await.unwrap();
    assert_eq!(response.status, 405);
    assert_eq!(container.caches().stats(), before);
    assert_eq!(container.caches().open("pwa-lab-v1").len(), entries_before);
    assert!(site
        .requests()
        .contains(&(RequestMethod::Post, "/index.html".to_string())));
}

#[tokio::test]
async fn test_non_get_offline_is_network_error() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    site.set_offline(true);

    let request = Request::new("/index.html").with_method(RequestMethod::Put);
    let err = container.fetch(request).await.unwrap_err();
    assert_eq!(err, FetchError::Offline);
}
