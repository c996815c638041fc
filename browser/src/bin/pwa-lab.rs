//! PWA Lab demo
//!
//! Loads the demo page against an in-memory origin, registers the worker,
//! then drops the network and shows what still works offline.
//!
//! Usage: `pwa-lab [--config <worker.json>] [--store <db.json>]` (see `--help`)
//! With the `http` feature, `--origin <url>` serves the page from a real
//! HTTP origin instead.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pwa_lab_browser::pwa::{
    BeforeInstallPromptEvent, DemoPage, FixedPermission, InstallOutcome, KeyValueStore,
    NotificationPermission, PlatformFeatures,
};
use pwa_lab_runtime::service_worker::{
    Network, Request, StaticNetwork, WorkerConfig, DEFAULT_CORE_ASSETS,
};

const ORIGIN: &str = "https://pwa.local";

/// Run the PWA Lab page through an online and an offline pass
#[derive(Parser, Debug)]
#[command(name = "pwa-lab", version, about)]
struct Cli {
    /// Worker configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key-value store file; kept in memory when omitted
    #[arg(long)]
    store: Option<PathBuf>,

    /// Serve the page from this HTTP origin (needs the `http` feature)
    #[arg(long)]
    origin: Option<String>,
}

fn demo_site() -> Arc<StaticNetwork> {
    let net = StaticNetwork::new();
    for asset in DEFAULT_CORE_ASSETS {
        net.route(asset, format!("/* {} */", asset));
    }
    net.route("/", "<!doctype html><title>PWA Lab</title>");
    net.route("/index.html", "<!doctype html><title>PWA Lab</title>");
    net.route("/offline.html", "<!doctype html><title>Offline</title><p>You are offline.</p>");
    net.route(
        "/data/sample.json",
        r#"{"message":"Data served from cache when offline."}"#,
    );
    Arc::new(net)
}

#[cfg(feature = "http")]
fn http_origin(origin: &str) -> Result<Arc<dyn Network>, Box<dyn Error>> {
    Ok(Arc::new(pwa_lab_runtime::service_worker::HttpNetwork::new(origin)?))
}

#[cfg(not(feature = "http"))]
fn http_origin(_origin: &str) -> Result<Arc<dyn Network>, Box<dyn Error>> {
    Err("--origin needs the `http` feature".into())
}

fn print_status(page: &DemoPage) {
    let status = page.status();
    for (label, line) in [
        ("install", &status.install),
        ("cache test", &status.cache_test),
        ("notify", &status.notify),
        ("storage", &status.storage),
        ("share", &status.share),
    ] {
        if let Some(line) = line {
            println!("  {:<11} {}", label, line);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => WorkerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => WorkerConfig::default(),
    };
    let store = match &args.store {
        Some(path) => KeyValueStore::open(path)?,
        None => KeyValueStore::in_memory(),
    };

    let site = demo_site();
    let (origin, network): (&str, Arc<dyn Network>) = match &args.origin {
        Some(origin) => (origin.as_str(), http_origin(origin)?),
        None => (ORIGIN, site.clone() as Arc<dyn Network>),
    };

    let mut page = DemoPage::new(origin, "/", PlatformFeatures::all(), network, Some(store));

    println!("Capabilities:");
    for row in page.capabilities() {
        println!("  {:<15} {}", row.label, row.status());
    }

    page.register_service_worker(config).await;
    page.before_install_prompt(BeforeInstallPromptEvent::new(vec!["web".to_string()]));
    page.click_install(|| InstallOutcome::Accepted);
    page.test_cache().await;
    page.send_notification(&mut FixedPermission(NotificationPermission::Granted));
    page.save_timestamp();
    page.share(None);
    page.container().settle().await;

    println!("Online:");
    print_status(&page);

    site.set_offline(true);
    log::info!("network offline");

    page.test_cache().await;
    for url in ["/", "/about"] {
        match page.container().fetch(Request::navigate(url)).await {
            Ok(response) => println!("  navigate {:<6} {} {}", url, response.status, response.text()),
            Err(err) => println!("  navigate {:<6} {}", url, err),
        }
    }

    println!("Offline:");
    print_status(&page);
    Ok(())
}
