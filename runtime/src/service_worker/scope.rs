//! Worker Global Scope
//!
//! Everything a running worker can reach: its configuration, the cache
//! storage, the network, the clients it may control, the notifications it
//! displayed, and the background work it started.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spin::Mutex;
use tokio::task::JoinHandle;

use super::cache::{Cache, CacheStorage};
use super::clients::Clients;
use super::config::WorkerConfig;
use super::network::Network;
use super::notification::Notifications;
use super::ServiceWorkerId;

/// Work spawned past the end of the event that started it.
///
/// Revalidation fetches outlive the response they were started for; they
/// are tracked here so a host can wait for the cache to go quiet.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundTasks {
    /// Create an empty task set
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` onto the current runtime
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tasks still running
    pub fn pending(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every spawned task, including ones spawned meanwhile, is done
    pub async fn settle(&self) {
        loop {
            let batch: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock());
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(err) = handle.await {
                    log::warn!("background task aborted: {}", err);
                }
            }
        }
    }
}

/// Shared state of one worker instance. Cheap to clone.
#[derive(Clone)]
pub struct WorkerGlobalScope {
    id: ServiceWorkerId,
    config: Arc<WorkerConfig>,
    caches: Arc<CacheStorage>,
    network: Arc<dyn Network>,
    clients: Clients,
    notifications: Notifications,
    background: BackgroundTasks,
    skip_waiting: Arc<AtomicBool>,
}

impl WorkerGlobalScope {
    /// Create a scope for a new worker
    pub fn new(
        config: WorkerConfig,
        caches: Arc<CacheStorage>,
        network: Arc<dyn Network>,
        clients: Clients,
    ) -> Self {
        Self {
            id: ServiceWorkerId::new(),
            config: Arc::new(config),
            caches,
            network,
            clients,
            notifications: Notifications::new(),
            background: BackgroundTasks::new(),
            skip_waiting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The worker this scope belongs to
    pub fn id(&self) -> ServiceWorkerId {
        self.id
    }

    /// Deployment configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// All cache generations of the origin
    pub fn caches(&self) -> &Arc<CacheStorage> {
        &self.caches
    }

    /// The generation named by the configured cache version
    pub fn current_cache(&self) -> Cache {
        self.caches.open(&self.config.cache_version)
    }

    /// Network used for all fetches
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    /// Pages of the origin
    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    /// Notifications shown by this worker
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Background work started by event handlers
    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }

    /// Activate as soon as installed instead of waiting for old clients to go
    pub fn skip_waiting(&self) {
        log::debug!("{}: skip waiting", self.id);
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    /// Whether [`skip_waiting`](Self::skip_waiting) was called
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }
}
