//! Service Worker Events
//!
//! Typed worker events and the dispatcher that runs them.
//!
//! Handlers never block. They register futures on the event instead:
//! [`ExtendableEvent::wait_until`] extends the event's lifetime until a task
//! finishes, and [`FetchEvent::respond_with`] supplies the response. The
//! dispatcher awaits those futures before it reports the event as handled.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};

use super::fetch::{FetchResult, Request};
use super::notification::ShownNotification;
use super::scope::BackgroundTasks;
use super::ServiceWorkerError;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Install event
    Install,
    /// Activate event
    Activate,
    /// Fetch event
    Fetch,
    /// Notification click event
    NotificationClick,
}

/// A task the event must outlive
pub type EventTask = BoxFuture<'static, Result<(), ServiceWorkerError>>;

/// An event whose lifetime handlers can extend
pub struct ExtendableEvent {
    event_type: EventType,
    tasks: Vec<EventTask>,
}

impl ExtendableEvent {
    /// Create new event
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            tasks: Vec::new(),
        }
    }

    /// Get event type
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Keep the event alive until `task` completes.
    ///
    /// If the task fails, the event fails.
    pub fn wait_until<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), ServiceWorkerError>> + Send + 'static,
    {
        self.tasks.push(task.boxed());
    }

    /// Check if wait_until was called
    pub fn has_wait_until(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Number of registered tasks
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Run every registered task to completion.
    ///
    /// All tasks are driven to the end even when one fails; the first error
    /// (in registration order) is returned.
    pub async fn settle(self) -> Result<(), ServiceWorkerError> {
        join_all(self.tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<()>, _>>()
            .map(|_| ())
    }

    fn into_tasks(self) -> Vec<EventTask> {
        self.tasks
    }
}

impl fmt::Debug for ExtendableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendableEvent")
            .field("event_type", &self.event_type)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

/// Fetch event
pub struct FetchEvent {
    request: Request,
    response: Option<BoxFuture<'static, FetchResult>>,
    extend: ExtendableEvent,
}

impl FetchEvent {
    /// Create a new fetch event
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: None,
            extend: ExtendableEvent::new(EventType::Fetch),
        }
    }

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Check if respondWith was called
    pub fn responded(&self) -> bool {
        self.response.is_some()
    }

    /// Answer the request with the outcome of `response`.
    ///
    /// Only the first call counts.
    pub fn respond_with<F>(&mut self, response: F)
    where
        F: Future<Output = FetchResult> + Send + 'static,
    {
        if self.response.is_some() {
            log::warn!("respond_with called twice for {}", self.request.key());
            return;
        }
        self.response = Some(response.boxed());
    }

    /// Keep the event alive past the response
    pub fn wait_until<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), ServiceWorkerError>> + Send + 'static,
    {
        self.extend.wait_until(task);
    }
}

/// Notification click event
pub struct NotificationClickEvent {
    notification: ShownNotification,
    action: Option<String>,
    extend: ExtendableEvent,
}

impl NotificationClickEvent {
    /// Create new notification click event
    pub fn new(notification: ShownNotification, action: Option<String>) -> Self {
        Self {
            notification,
            action,
            extend: ExtendableEvent::new(EventType::NotificationClick),
        }
    }

    /// The clicked notification
    pub fn notification(&self) -> &ShownNotification {
        &self.notification
    }

    /// Get action
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Keep the event alive until `task` completes
    pub fn wait_until<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), ServiceWorkerError>> + Send + 'static,
    {
        self.extend.wait_until(task);
    }
}

/// Reacts to worker events.
///
/// Every method has a no-op default, so a handler only implements the events
/// it listens for. A fetch handler that never calls `respond_with` lets the
/// request pass through to the network.
pub trait EventHandler: Send + Sync {
    /// Handle the install event
    fn on_install(&self, _event: &mut ExtendableEvent) {}

    /// Handle the activate event
    fn on_activate(&self, _event: &mut ExtendableEvent) {}

    /// Handle a fetch event
    fn on_fetch(&self, _event: &mut FetchEvent) {}

    /// Handle a notification click
    fn on_notification_click(&self, _event: &mut NotificationClickEvent) {}
}

/// Handler that listens for nothing
pub struct DefaultEventHandler;

impl EventHandler for DefaultEventHandler {}

/// Event dispatcher
///
/// Routes events to one handler and awaits what the handler registered.
pub struct EventDispatcher {
    handler: Arc<dyn EventHandler>,
    background: BackgroundTasks,
}

impl EventDispatcher {
    /// Create new dispatcher
    pub fn new(handler: Arc<dyn EventHandler>, background: BackgroundTasks) -> Self {
        Self {
            handler,
            background,
        }
    }

    /// Dispatch install or activate and wait for every extension task
    pub async fn dispatch_lifecycle(&self, event_type: EventType) -> Result<(), ServiceWorkerError> {
        let mut event = ExtendableEvent::new(event_type);
        match event_type {
            EventType::Install => self.handler.on_install(&mut event),
            EventType::Activate => self.handler.on_activate(&mut event),
            other => {
                log::warn!("{:?} is not a lifecycle event", other);
                return Ok(());
            }
        }
        log::debug!("{:?}: waiting on {} task(s)", event_type, event.pending());
        event.settle().await
    }

    /// Dispatch a fetch event.
    ///
    /// Returns once the response is known; extension tasks keep running in
    /// the background.
    pub async fn dispatch_fetch(&self, request: Request) -> FetchResult {
        let mut event = FetchEvent::new(request);
        self.handler.on_fetch(&mut event);

        let FetchEvent {
            request,
            response,
            extend,
        } = event;
        for task in extend.into_tasks() {
            let url = request.url.clone();
            self.background.spawn(async move {
                if let Err(err) = task.await {
                    log::warn!("fetch {}: extension task failed: {}", url, err);
                }
            });
        }

        match response {
            Some(response) => response.await,
            None => {
                log::trace!("fetch {}: passthrough", request.key());
                FetchResult::Passthrough
            }
        }
    }

    /// Dispatch a notification click and wait for its tasks
    pub async fn dispatch_notification_click(
        &self,
        notification: ShownNotification,
        action: Option<String>,
    ) -> Result<(), ServiceWorkerError> {
        let mut event = NotificationClickEvent::new(notification, action);
        self.handler.on_notification_click(&mut event);
        event.extend.settle().await
    }
}
