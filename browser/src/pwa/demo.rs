//! Demo Page
//!
//! The PWA Lab page: capability checklist, worker registration, and one
//! button per feature. Every button updates a status line; nothing here is
//! fatal.

use std::sync::Arc;

use serde::Deserialize;

use pwa_lab_runtime::service_worker::{
    Network, Request, ServiceWorkerContainer, WorkerConfig,
};

use super::capabilities::{render_capabilities, CapabilityRow, PlatformFeatures};
use super::install::{BeforeInstallPromptEvent, InstallOutcome, InstallPrompt};
use super::notification_bridge::{NotificationBridge, PermissionRequester};
use super::share::{share_page, ShareData, ShareTarget};
use super::web_storage::KeyValueStore;

/// Resource fetched by the cache test
pub const SAMPLE_DATA_URL: &str = "/data/sample.json";

/// Status lines shown under each section of the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    pub install: Option<String>,
    pub cache_test: Option<String>,
    pub notify: Option<String>,
    pub storage: Option<String>,
    pub share: Option<String>,
}

#[derive(Deserialize)]
struct SampleData {
    message: String,
}

/// PWA Lab page state
pub struct DemoPage {
    url: String,
    features: PlatformFeatures,
    container: ServiceWorkerContainer,
    install: InstallPrompt,
    notifications: NotificationBridge,
    store: Option<KeyValueStore>,
    status: StatusBoard,
}

impl DemoPage {
    /// Load the page at `url`; `store` is None when the platform has no
    /// indexed storage.
    pub fn new(
        origin: &str,
        url: &str,
        features: PlatformFeatures,
        network: Arc<dyn Network>,
        store: Option<KeyValueStore>,
    ) -> Self {
        let container = ServiceWorkerContainer::new(origin, network);
        container.open_page(url);
        let mut page = Self {
            url: format!("{}{}", origin, url),
            features,
            container,
            install: InstallPrompt::new(),
            notifications: NotificationBridge::new(features.contains(PlatformFeatures::NOTIFICATIONS)),
            store: store.filter(|_| features.contains(PlatformFeatures::INDEXED_DB)),
            status: StatusBoard::default(),
        };
        page.status.storage = page.store.as_ref().and_then(KeyValueStore::load_status);
        page
    }

    /// Status lines
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// The page's service worker container
    pub fn container(&self) -> &ServiceWorkerContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut ServiceWorkerContainer {
        &mut self.container
    }

    /// Capability checklist
    pub fn capabilities(&self) -> Vec<CapabilityRow> {
        render_capabilities(self.features)
    }

    /// Register the worker at startup.
    pub async fn register_service_worker(&mut self, config: WorkerConfig) {
        if !self.features.contains(PlatformFeatures::SERVICE_WORKER) {
            self.status.install = Some("Service Worker not supported.".to_string());
            return;
        }
        match self.container.register(config).await {
            Ok(registration) => {
                if registration.waiting().is_some() {
                    self.status.install = Some("Update pending.".to_string());
                }
            }
            Err(err) => {
                log::error!("registration failed: {}", err);
                self.status.install = Some(format!("SW error: {}", err));
            }
        }
    }

    /// The platform offered an install prompt.
    pub fn before_install_prompt(&mut self, event: BeforeInstallPromptEvent) {
        if self.features.contains(PlatformFeatures::INSTALL_PROMPT) {
            self.install.defer(event);
        }
    }

    pub fn install_button_visible(&self) -> bool {
        self.install.button_visible()
    }

    /// Install button; `ask` shows the prompt to the user.
    pub fn click_install(&mut self, ask: impl FnOnce() -> InstallOutcome) {
        self.status.install = Some(self.install.click(ask));
    }

    /// Show or hide the manual install instructions.
    pub fn toggle_install_help(&mut self) -> bool {
        self.install.toggle_help()
    }

    /// Fetch the sample data through the worker.
    pub async fn test_cache(&mut self) {
        let status = match self.container.fetch(Request::new(SAMPLE_DATA_URL)).await {
            Ok(response) => match response.json::<SampleData>() {
                Ok(data) => format!("OK: {}", data.message),
                Err(err) => {
                    log::debug!("{} is not sample data: {}", SAMPLE_DATA_URL, err);
                    "Offline or resource unavailable.".to_string()
                }
            },
            Err(err) => {
                log::debug!("{}: {}", SAMPLE_DATA_URL, err);
                "Offline or resource unavailable.".to_string()
            }
        };
        self.status.cache_test = Some(status);
    }

    /// Notification button
    pub fn send_notification(&mut self, requester: &mut dyn PermissionRequester) {
        let status = self
            .notifications
            .send_local_notification(requester, &self.container);
        self.status.notify = Some(status);
    }

    /// Save button
    pub fn save_timestamp(&mut self) {
        self.status.storage = Some(match self.store.as_mut() {
            Some(store) => store.save_status(),
            None => "IndexedDB not supported.".to_string(),
        });
    }

    /// Share button
    pub fn share(&mut self, target: Option<&mut dyn ShareTarget>) {
        let target = target.filter(|_| self.features.contains(PlatformFeatures::WEB_SHARE));
        self.status.share = Some(share_page(target, &ShareData::for_page(self.url.clone())));
    }
}
