//! Service Worker Lifecycle Management
//!
//! State transitions of a worker, and the cache work that belongs to the
//! install and activate phases.

use super::scope::WorkerGlobalScope;
use super::{ServiceWorkerError, ServiceWorkerId, ServiceWorkerState};

/// Lifecycle event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Install started
    Install(ServiceWorkerId),
    /// Activate started
    Activate(ServiceWorkerId),
    /// State change
    StateChange(StateChangeEvent),
}

/// State change event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeEvent {
    /// Worker ID
    pub worker_id: ServiceWorkerId,
    /// Old state
    pub old_state: ServiceWorkerState,
    /// New state
    pub new_state: ServiceWorkerState,
}

/// Lifecycle manager
#[derive(Debug, Default)]
pub struct LifecycleManager {
    /// Events recorded so far
    pending_events: Vec<LifecycleEvent>,
}

impl LifecycleManager {
    /// Create new lifecycle manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Get pending events
    pub fn pending_events(&self) -> &[LifecycleEvent] {
        &self.pending_events
    }

    /// Move `state` to `new_state`, recording the change
    pub fn transition_state(
        &mut self,
        worker_id: ServiceWorkerId,
        state: &mut ServiceWorkerState,
        new_state: ServiceWorkerState,
    ) -> Result<(), ServiceWorkerError> {
        let old_state = *state;

        if !is_valid_transition(old_state, new_state) {
            return Err(ServiceWorkerError::InvalidStateTransition {
                from: old_state,
                to: new_state,
            });
        }

        *state = new_state;
        log::debug!("{}: {:?} -> {:?}", worker_id, old_state, new_state);

        self.pending_events
            .push(LifecycleEvent::StateChange(StateChangeEvent {
                worker_id,
                old_state,
                new_state,
            }));

        match new_state {
            ServiceWorkerState::Installing => {
                self.pending_events.push(LifecycleEvent::Install(worker_id));
            }
            ServiceWorkerState::Activating => {
                self.pending_events.push(LifecycleEvent::Activate(worker_id));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Check if a state transition is valid
fn is_valid_transition(from: ServiceWorkerState, to: ServiceWorkerState) -> bool {
    use ServiceWorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant) // install failed
            | (Installed, Activating)
            | (Installed, Redundant) // superseded while waiting
            | (Activating, Activated)
            | (Activating, Redundant) // activate failed
            | (Activated, Redundant) // replaced by new worker
    )
}

/// Fill the current generation with the core assets.
///
/// All-or-nothing: if any asset cannot be fetched, nothing is stored and the
/// install fails.
pub async fn precache_core_assets(scope: &WorkerGlobalScope) -> Result<(), ServiceWorkerError> {
    let config = scope.config();
    let cache = scope.current_cache();
    log::info!(
        "{}: pre-caching {} core assets into {}",
        scope.id(),
        config.core_assets.len(),
        cache.name()
    );
    cache
        .add_all(scope.network().as_ref(), config.core_assets.iter().cloned())
        .await?;
    Ok(())
}

/// Delete every cache generation except the current one.
///
/// Returns the names that were deleted.
pub fn delete_stale_generations(scope: &WorkerGlobalScope) -> Vec<String> {
    let current = &scope.config().cache_version;
    let caches = scope.caches();
    let stale: Vec<String> = caches
        .keys()
        .into_iter()
        .filter(|name| name != current)
        .collect();
    for name in &stale {
        log::info!("{}: deleting stale cache generation {}", scope.id(), name);
        caches.delete(name);
    }
    stale
}
