//! Test fixtures and data factories
//!
//! An in-memory PWA Lab origin and helpers to bring a worker up on it.

use std::sync::Arc;

use pwa_lab_runtime::service_worker::{
    ServiceWorkerContainer, StaticNetwork, WorkerConfig, DEFAULT_CORE_ASSETS,
};

/// Origin every suite runs against
pub const ORIGIN: &str = "https://pwa.local";

/// Message carried by `/data/sample.json`
pub const SAMPLE_MESSAGE: &str = "Data served from cache when offline.";

/// Page bodies of the demo origin
pub struct SiteFixtures;

impl SiteFixtures {
    /// App shell
    pub fn index_page() -> String {
        String::from(
            r#"<!doctype html>
<html lang="en">
<head>
    <title>PWA Lab</title>
    <link rel="manifest" href="/manifest.json">
    <link rel="stylesheet" href="/styles.css">
</head>
<body>
    <button id="cacheTestBtn">Test cache</button>
    <script src="/app.js"></script>
</body>
</html>"#,
        )
    }

    /// Shown for navigations that have neither network nor cache
    pub fn offline_page() -> String {
        String::from(
            r#"<!doctype html>
<html lang="en">
<head><title>Offline</title></head>
<body><p>You are offline.</p></body>
</html>"#,
        )
    }

    pub fn manifest() -> String {
        serde_json::json!({
            "name": "PWA Lab",
            "short_name": "PWA Lab",
            "start_url": "/",
            "display": "standalone",
            "icons": [
                { "src": "/assets/icons/icon-192.svg", "sizes": "192x192" },
                { "src": "/assets/icons/icon-512.svg", "sizes": "512x512" }
            ]
        })
        .to_string()
    }

    pub fn sample_data(message: &str) -> String {
        serde_json::json!({ "message": message }).to_string()
    }
}

/// The demo origin: every core asset plus the real page bodies.
pub fn pwa_site() -> Arc<StaticNetwork> {
    let net = StaticNetwork::new();
    for asset in DEFAULT_CORE_ASSETS {
        net.route(asset, format!("/* {} */", asset));
    }
    net.route("/", SiteFixtures::index_page());
    net.route("/index.html", SiteFixtures::index_page());
    net.route("/offline.html", SiteFixtures::offline_page());
    net.route("/manifest.json", SiteFixtures::manifest());
    net.route("/data/sample.json", SiteFixtures::sample_data(SAMPLE_MESSAGE));
    Arc::new(net)
}

/// A container over `site` with `config` registered and active.
pub async fn registered(site: &Arc<StaticNetwork>, config: WorkerConfig) -> ServiceWorkerContainer {
    let mut container = ServiceWorkerContainer::new(ORIGIN, site.clone());
    if let Err(err) = container.register(config).await {
        panic!("registration failed: {}", err);
    }
    container
}
