//! Service Worker Registration
//!
//! The page-side view of the worker: registering a new version, tracking the
//! active and waiting workers, and routing page requests through whichever
//! worker controls the origin.

use std::sync::Arc;

use super::cache::CacheStorage;
use super::clients::{ClientId, Clients};
use super::config::WorkerConfig;
use super::fetch::{FetchError, FetchResult, Request, Response};
use super::network::Network;
use super::scope::WorkerGlobalScope;
use super::{ServiceWorker, ServiceWorkerError};

/// Active and waiting workers of the origin
#[derive(Debug, Default)]
pub struct ServiceWorkerRegistration {
    /// Worker controlling pages
    active: Option<ServiceWorker>,
    /// Installed worker waiting for the active one to go
    waiting: Option<ServiceWorker>,
}

impl ServiceWorkerRegistration {
    /// The active worker
    pub fn active(&self) -> Option<&ServiceWorker> {
        self.active.as_ref()
    }

    /// The waiting worker
    pub fn waiting(&self) -> Option<&ServiceWorker> {
        self.waiting.as_ref()
    }
}

/// Service Worker Container
///
/// Owns the origin's shared resources (caches, network, clients) and the
/// registration built on top of them.
pub struct ServiceWorkerContainer {
    origin: String,
    caches: Arc<CacheStorage>,
    network: Arc<dyn Network>,
    clients: Clients,
    registration: Option<ServiceWorkerRegistration>,
}

impl ServiceWorkerContainer {
    /// Create a new container
    pub fn new(origin: impl Into<String>, network: Arc<dyn Network>) -> Self {
        Self::with_storage(origin, network, Arc::new(CacheStorage::new()))
    }

    /// Create a container over existing cache storage
    pub fn with_storage(
        origin: impl Into<String>,
        network: Arc<dyn Network>,
        caches: Arc<CacheStorage>,
    ) -> Self {
        Self {
            origin: origin.into(),
            caches,
            network,
            clients: Clients::new(),
            registration: None,
        }
    }

    /// Get the origin
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Cache storage of the origin
    pub fn caches(&self) -> &Arc<CacheStorage> {
        &self.caches
    }

    /// Pages of the origin
    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    /// Network used when no worker intercepts
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    /// Current registration
    pub fn registration(&self) -> Option<&ServiceWorkerRegistration> {
        self.registration.as_ref()
    }

    /// The worker controlling the origin's pages
    pub fn controller(&self) -> Option<&ServiceWorker> {
        self.registration
            .as_ref()
            .and_then(|r| r.active.as_ref())
            .filter(|w| w.is_active())
    }

    /// Register (or update to) a worker built from `config`.
    ///
    /// The new worker installs first. It activates straight away when nothing
    /// is active yet or when its install asked to skip waiting; otherwise it
    /// is left waiting. A failed install leaves the current worker in charge.
    pub async fn register(&mut self, config: WorkerConfig) -> Result<&ServiceWorkerRegistration, ServiceWorkerError> {
        config.validate()?;
        log::info!(
            "{}: registering {} (cache {})",
            self.origin,
            config.script_url,
            config.cache_version
        );

        let scope = WorkerGlobalScope::new(
            config,
            self.caches.clone(),
            self.network.clone(),
            self.clients.clone(),
        );
        let mut worker = ServiceWorker::new(scope);
        worker.install().await?;

        let registration = self.registration.get_or_insert_with(Default::default);
        if let Some(mut superseded) = registration.waiting.take() {
            superseded.make_redundant()?;
        }

        if registration.active.is_none() || worker.skip_waiting_requested() {
            Self::promote(registration, worker).await?;
        } else {
            log::info!("{}: {} installed, waiting", self.origin, worker.id());
            registration.waiting = Some(worker);
        }
        Ok(registration)
    }

    /// Activate the waiting worker, if there is one
    pub async fn activate_waiting(&mut self) -> Result<bool, ServiceWorkerError> {
        let Some(registration) = self.registration.as_mut() else {
            return Err(ServiceWorkerError::NotFound);
        };
        match registration.waiting.take() {
            Some(worker) => {
                Self::promote(registration, worker).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn promote(
        registration: &mut ServiceWorkerRegistration,
        mut worker: ServiceWorker,
    ) -> Result<(), ServiceWorkerError> {
        worker.activate().await?;
        if let Some(mut old) = registration.active.replace(worker) {
            old.settle().await;
            old.make_redundant()?;
        }
        Ok(())
    }

    /// Drop the registration; pages fall back to the network
    pub fn unregister(&mut self) -> Result<(), ServiceWorkerError> {
        let mut registration = self.registration.take().ok_or(ServiceWorkerError::NotFound)?;
        for mut worker in [registration.active.take(), registration.waiting.take()]
            .into_iter()
            .flatten()
        {
            let id = worker.id();
            worker.make_redundant()?;
            for client in self.clients.match_all(id, Default::default()) {
                self.clients.set_controller(client.id, None)?;
            }
        }
        Ok(())
    }

    /// Open a page; it is controlled by the active worker if there is one
    pub fn open_page(&self, url: &str) -> ClientId {
        let id = self.clients.add(url);
        if let Some(worker) = self.controller().filter(|w| w.config().in_scope(url)) {
            if let Err(err) = self.clients.set_controller(id, Some(worker.id())) {
                log::warn!("{}: could not control {}: {}", self.origin, id, err);
            }
        }
        id
    }

    /// Issue a request from a page.
    ///
    /// Goes through the controlling worker when there is one and it
    /// intercepts; otherwise straight to the network.
    pub async fn fetch(&self, request: Request) -> Result<Response, FetchError> {
        let Some(worker) = self.controller() else {
            return self.network.fetch(&request).await;
        };
        match worker.fetch(request.clone()).await {
            Ok(FetchResult::Response(response, source)) => {
                log::trace!("{} served from {:?}", request.key(), source);
                Ok(response)
            }
            Ok(FetchResult::NoResponse) => Err(FetchError::NoResponse(request.url)),
            Ok(FetchResult::Passthrough) | Err(_) => self.network.fetch(&request).await,
        }
    }

    /// Wait for background work of every worker to finish
    pub async fn settle(&self) {
        if let Some(registration) = &self.registration {
            for worker in [&registration.active, &registration.waiting].into_iter().flatten() {
                worker.settle().await;
            }
        }
    }
}
