//! Notifications
//!
//! Notifications displayed by a worker, and the payload pages send to ask
//! for one.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spin::RwLock;

/// Notification ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification#{}", self.0)
    }
}

/// Data carried to the click handler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationData {
    /// Page to open when the notification is clicked
    pub url: String,
}

/// A notification request: title plus display options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Title line
    pub title: String,
    /// Body text
    #[serde(default)]
    pub body: String,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Badge URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Click-through data
    #[serde(default)]
    pub data: NotificationData,
}

impl Notification {
    /// Create a notification with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the body text
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the icon
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the badge
    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Set the click-through URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.data.url = url.into();
        self
    }

    /// Click-through URL, defaulting to the origin root
    pub fn target_url(&self) -> &str {
        if self.data.url.is_empty() {
            "/"
        } else {
            &self.data.url
        }
    }
}

/// A notification currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownNotification {
    /// ID assigned when shown
    pub id: NotificationId,
    /// What is displayed
    pub notification: Notification,
}

#[derive(Default)]
struct NotificationsInner {
    shown: RwLock<BTreeMap<NotificationId, Notification>>,
    next_id: AtomicU64,
}

/// Notifications displayed by one worker. Cheap to clone.
#[derive(Clone, Default)]
pub struct Notifications {
    inner: Arc<NotificationsInner>,
}

impl Notifications {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Display a notification
    pub fn show(&self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        log::info!("{}: showing {:?}", id, notification.title);
        self.inner.shown.write().insert(id, notification);
        id
    }

    /// Get a displayed notification
    pub fn get(&self, id: NotificationId) -> Option<ShownNotification> {
        self.inner
            .shown
            .read()
            .get(&id)
            .map(|notification| ShownNotification {
                id,
                notification: notification.clone(),
            })
    }

    /// Dismiss a notification; returns whether it was displayed
    pub fn close(&self, id: NotificationId) -> bool {
        self.inner.shown.write().remove(&id).is_some()
    }

    /// All displayed notifications
    pub fn get_all(&self) -> Vec<ShownNotification> {
        self.inner
            .shown
            .read()
            .iter()
            .map(|(id, notification)| ShownNotification {
                id: *id,
                notification: notification.clone(),
            })
            .collect()
    }
}
