//! Service Worker Module
//!
//! Service worker lifecycle, event dispatch and request interception for the
//! PWA Lab offline demo.
//!
//! A [`ServiceWorker`] owns one cache generation (named by its
//! [`WorkerConfig`]), pre-caches the core assets when it installs, drops every
//! other generation when it activates, and then answers page requests with
//! one of two strategies: network-first for navigations and
//! stale-while-revalidate for every other GET.

mod cache;
mod clients;
mod config;
mod events;
mod fetch;
mod lifecycle;
mod network;
mod notification;
mod registration;
mod scope;
mod strategy;
mod worker;

pub use cache::*;
pub use clients::*;
pub use config::*;
pub use events::*;
pub use fetch::*;
pub use lifecycle::*;
pub use network::*;
pub use notification::*;
pub use registration::*;
pub use scope::*;
pub use strategy::*;
pub use worker::*;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Service Worker global ID counter
static NEXT_SW_ID: AtomicU64 = AtomicU64::new(1);

/// Service Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceWorkerState {
    /// Initial state, script evaluated
    #[default]
    Parsed,
    /// Installing (install event fired)
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activating (activate event fired)
    Activating,
    /// Active and controlling pages
    Activated,
    /// Failed or replaced
    Redundant,
}

/// Service Worker error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceWorkerError {
    /// Pre-caching the core assets failed
    #[error("install failed: {0}")]
    InstallFailed(#[from] CacheError),
    /// An activate task failed
    #[error("activate failed: {0}")]
    ActivateFailed(String),
    /// State transition invalid
    #[error("invalid state transition {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: ServiceWorkerState,
        to: ServiceWorkerState,
    },
    /// Configuration rejected
    #[error("invalid worker config: {0}")]
    InvalidConfig(String),
    /// No such registration
    #[error("no registration found")]
    NotFound,
    /// The worker is not active
    #[error("service worker is not active")]
    NotActive,
    /// No such client
    #[error("client {0} not found")]
    ClientNotFound(ClientId),
}

/// Service Worker ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceWorkerId(u64);

impl ServiceWorkerId {
    /// Create a new unique ID
    pub fn new() -> Self {
        Self(NEXT_SW_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get raw value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ServiceWorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceWorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sw#{}", self.0)
    }
}

/// A Service Worker instance
///
/// Couples the worker's global scope (caches, network, clients) with the
/// handler that reacts to its events. Lifecycle phases take `&mut self`;
/// fetches only need `&self`, so many can be in flight at once.
pub struct ServiceWorker {
    /// Current state
    state: ServiceWorkerState,
    /// Shared worker state
    scope: WorkerGlobalScope,
    /// Routes events to the handler
    dispatcher: EventDispatcher,
    /// Validates and records state transitions
    lifecycle: LifecycleManager,
}

impl ServiceWorker {
    /// Create a worker running the standard caching handler
    pub fn new(scope: WorkerGlobalScope) -> Self {
        let handler = Arc::new(CachingWorker::new(scope.clone()));
        Self::with_handler(scope, handler)
    }

    /// Create a worker with a custom event handler
    pub fn with_handler(scope: WorkerGlobalScope, handler: Arc<dyn EventHandler>) -> Self {
        let dispatcher = EventDispatcher::new(handler, scope.background().clone());
        Self {
            state: ServiceWorkerState::Parsed,
            scope,
            dispatcher,
            lifecycle: LifecycleManager::new(),
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> ServiceWorkerId {
        self.scope.id()
    }

    /// Get the worker's configuration
    pub fn config(&self) -> &WorkerConfig {
        self.scope.config()
    }

    /// Get the worker's global scope
    pub fn scope(&self) -> &WorkerGlobalScope {
        &self.scope
    }

    /// Get current state
    pub fn state(&self) -> ServiceWorkerState {
        self.state
    }

    /// Lifecycle events recorded so far
    pub fn lifecycle_events(&self) -> &[LifecycleEvent] {
        self.lifecycle.pending_events()
    }

    /// Check if the worker is active
    pub fn is_active(&self) -> bool {
        self.state == ServiceWorkerState::Activated
    }

    /// Check if the worker is installing
    pub fn is_installing(&self) -> bool {
        self.state == ServiceWorkerState::Installing
    }

    /// Check if the worker is waiting
    pub fn is_waiting(&self) -> bool {
        self.state == ServiceWorkerState::Installed
    }

    /// Whether the install handler asked to skip the waiting phase
    pub fn skip_waiting_requested(&self) -> bool {
        self.scope.skip_waiting_requested()
    }

    /// Run the install phase.
    ///
    /// Completes only after every task the handler registered with
    /// `wait_until` has finished. Any failure leaves the worker redundant.
    pub async fn install(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(ServiceWorkerState::Installing)?;
        match self.dispatcher.dispatch_lifecycle(EventType::Install).await {
            Ok(()) => {
                self.transition(ServiceWorkerState::Installed)?;
                log::info!("{}: installed", self.id());
                Ok(())
            }
            Err(err) => {
                log::warn!("{}: install failed: {}", self.id(), err);
                self.transition(ServiceWorkerState::Redundant)?;
                Err(err)
            }
        }
    }

    /// Run the activate phase
    pub async fn activate(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(ServiceWorkerState::Activating)?;
        match self.dispatcher.dispatch_lifecycle(EventType::Activate).await {
            Ok(()) => {
                self.transition(ServiceWorkerState::Activated)?;
                log::info!("{}: activated", self.id());
                Ok(())
            }
            Err(err) => {
                log::warn!("{}: activate failed: {}", self.id(), err);
                self.transition(ServiceWorkerState::Redundant)?;
                Err(err)
            }
        }
    }

    /// Intercept a page request
    pub async fn fetch(&self, request: Request) -> Result<FetchResult, ServiceWorkerError> {
        if !self.is_active() {
            return Err(ServiceWorkerError::NotActive);
        }
        Ok(self.dispatcher.dispatch_fetch(request).await)
    }

    /// Display a notification on behalf of a page
    pub fn show_notification(&self, notification: Notification) -> Result<NotificationId, ServiceWorkerError> {
        if !self.is_active() {
            return Err(ServiceWorkerError::NotActive);
        }
        Ok(self.scope.notifications().show(notification))
    }

    /// Deliver a click on a notification this worker displayed
    pub async fn notification_click(
        &self,
        id: NotificationId,
        action: Option<String>,
    ) -> Result<(), ServiceWorkerError> {
        let notification = self
            .scope
            .notifications()
            .get(id)
            .ok_or(ServiceWorkerError::NotFound)?;
        self.dispatcher
            .dispatch_notification_click(notification, action)
            .await
    }

    /// Wait for background cache revalidation to finish
    pub async fn settle(&self) {
        self.scope.background().settle().await;
    }

    /// Mark the worker as replaced
    pub fn make_redundant(&mut self) -> Result<(), ServiceWorkerError> {
        self.transition(ServiceWorkerState::Redundant)
    }

    fn transition(&mut self, to: ServiceWorkerState) -> Result<(), ServiceWorkerError> {
        let id = self.id();
        self.lifecycle.transition_state(id, &mut self.state, to)
    }
}

impl fmt::Debug for ServiceWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("id", &self.id())
            .field("state", &self.state)
            .field("cache_version", &self.config().cache_version)
            .finish()
    }
}
