//! Worker Configuration
//!
//! Deployment-time settings for a service worker. A config is fixed when the
//! worker is created; shipping a new cache version means creating a new
//! worker with a new config.

use serde::Deserialize;

use super::ServiceWorkerError;

/// Cache generation name used when none is configured.
pub const DEFAULT_CACHE_VERSION: &str = "pwa-lab-v1";

/// Page served for navigations that neither the network nor the cache can satisfy.
pub const DEFAULT_OFFLINE_PATH: &str = "/offline.html";

/// Resources that must be cached before a worker may finish installing.
pub const DEFAULT_CORE_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/manifest.json",
    "/offline.html",
    "/data/sample.json",
    "/assets/icons/icon-192.svg",
    "/assets/icons/icon-512.svg",
];

/// Service worker configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Name of the current cache generation
    pub cache_version: String,
    /// URLs pre-cached at install time
    pub core_assets: Vec<String>,
    /// Fallback page for failed navigations
    pub offline_path: String,
    /// Path prefix of pages this worker controls
    pub scope: String,
    /// Script URL the worker was registered from
    pub script_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            core_assets: DEFAULT_CORE_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_path: DEFAULT_OFFLINE_PATH.to_string(),
            scope: "/".to_string(),
            script_url: "/sw.js".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Default config with a different cache version
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            cache_version: version.into(),
            ..Self::default()
        }
    }

    /// Parse a config from JSON; missing fields take their defaults.
    ///
    /// ```json
    /// { "cacheVersion": "pwa-lab-v2", "offlinePath": "/offline.html" }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ServiceWorkerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ServiceWorkerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the worker relies on
    pub fn validate(&self) -> Result<(), ServiceWorkerError> {
        if self.cache_version.trim().is_empty() {
            return Err(ServiceWorkerError::InvalidConfig(
                "cache version must not be empty".to_string(),
            ));
        }
        if !self.offline_path.starts_with('/') {
            return Err(ServiceWorkerError::InvalidConfig(format!(
                "offline path must be origin-relative, got {:?}",
                self.offline_path
            )));
        }
        // the fallback is only reachable offline if install cached it
        if !self.core_assets.iter().any(|a| *a == self.offline_path) {
            return Err(ServiceWorkerError::InvalidConfig(format!(
                "offline path {} is not a core asset",
                self.offline_path
            )));
        }
        Ok(())
    }

    /// Whether `url` falls inside this worker's scope
    pub fn in_scope(&self, url: &str) -> bool {
        url.starts_with(&self.scope)
    }
}
