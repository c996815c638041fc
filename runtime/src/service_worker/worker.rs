//! The PWA Lab worker script
//!
//! Event handlers of the offline-caching worker: pre-cache on install, purge
//! old generations on activate, route fetches to a strategy, and bring a page
//! forward when a notification is clicked.

use super::clients::{ClientType, MatchAllOptions};
use super::events::{EventHandler, ExtendableEvent, FetchEvent, NotificationClickEvent};
use super::lifecycle::{delete_stale_generations, precache_core_assets};
use super::scope::WorkerGlobalScope;
use super::strategy::{apply_strategy, select_strategy};

/// Offline-caching event handler
pub struct CachingWorker {
    scope: WorkerGlobalScope,
}

impl CachingWorker {
    /// Create the handler for `scope`
    pub fn new(scope: WorkerGlobalScope) -> Self {
        Self { scope }
    }
}

impl EventHandler for CachingWorker {
    fn on_install(&self, event: &mut ExtendableEvent) {
        let scope = self.scope.clone();
        event.wait_until(async move {
            precache_core_assets(&scope).await?;
            scope.skip_waiting();
            Ok(())
        });
    }

    fn on_activate(&self, event: &mut ExtendableEvent) {
        let scope = self.scope.clone();
        event.wait_until(async move {
            delete_stale_generations(&scope);
            scope.clients().claim(scope.id());
            Ok(())
        });
    }

    fn on_fetch(&self, event: &mut FetchEvent) {
        let Some(strategy) = select_strategy(event.request()) else {
            return;
        };
        log::trace!("fetch {}: {:?}", event.request().key(), strategy);
        let request = event.request().clone();
        event.respond_with(apply_strategy(strategy, self.scope.clone(), request));
    }

    fn on_notification_click(&self, event: &mut NotificationClickEvent) {
        let shown = event.notification().clone();
        self.scope.notifications().close(shown.id);

        let scope = self.scope.clone();
        event.wait_until(async move {
            let windows = scope.clients().match_all(
                scope.id(),
                MatchAllOptions {
                    include_uncontrolled: true,
                    client_type: ClientType::Window,
                },
            );
            match windows.iter().find(|c| scope.config().in_scope(&c.url)) {
                Some(client) => {
                    log::debug!("{}: focusing {}", shown.id, client.id);
                    scope.clients().focus(client.id)?;
                }
                None => {
                    let url = shown.notification.target_url();
                    log::debug!("{}: opening window at {}", shown.id, url);
                    scope.clients().open_window(url, Some(scope.id()));
                }
            }
            Ok(())
        });
    }
}
