//! Notification API Bridge
//!
//! Page side of local notifications: permission check, then hand the
//! notification to the controlling service worker.

use pwa_lab_runtime::service_worker::{Notification, ServiceWorkerContainer};

/// Icon and badge used by the demo notification
pub const NOTIFICATION_ICON: &str = "/assets/icons/icon-192.svg";

// ── Permission ──────────────────────────────────────────────

/// Permission state of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    /// User hasn't been asked yet.
    #[default]
    Default,
    /// User granted permission.
    Granted,
    /// User denied permission.
    Denied,
}

/// Something that can ask the user for notification permission.
pub trait PermissionRequester {
    /// Prompt the user; only called while the permission is `Default`.
    fn request_permission(&mut self) -> NotificationPermission;
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission(pub NotificationPermission);

impl PermissionRequester for FixedPermission {
    fn request_permission(&mut self) -> NotificationPermission {
        self.0
    }
}

// ── Bridge ──────────────────────────────────────────────────

/// Remembers the permission answer between clicks.
#[derive(Debug, Default)]
pub struct NotificationBridge {
    supported: bool,
    permission: NotificationPermission,
}

impl NotificationBridge {
    /// Create a bridge; `supported` is whether the platform has notifications.
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            permission: NotificationPermission::Default,
        }
    }

    /// Current permission.
    pub fn permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Ask for permission unless already decided.
    pub fn request_permission(&mut self, requester: &mut dyn PermissionRequester) -> NotificationPermission {
        if self.permission == NotificationPermission::Default {
            self.permission = requester.request_permission();
        }
        self.permission
    }

    /// The notification the demo sends.
    pub fn demo_notification() -> Notification {
        Notification::new("PWA Lab")
            .with_body("Local notification delivered via Service Worker.")
            .with_icon(NOTIFICATION_ICON)
            .with_badge(NOTIFICATION_ICON)
            .with_url("/")
    }

    /// Send the demo notification through the controlling worker.
    ///
    /// Returns the status line for the page.
    pub fn send_local_notification(
        &mut self,
        requester: &mut dyn PermissionRequester,
        container: &ServiceWorkerContainer,
    ) -> String {
        if !self.supported {
            return "Notifications not supported.".to_string();
        }
        if self.request_permission(requester) != NotificationPermission::Granted {
            return "Permission denied.".to_string();
        }
        let Some(worker) = container.controller() else {
            return "Service Worker not registered.".to_string();
        };
        match worker.show_notification(Self::demo_notification()) {
            Ok(id) => {
                log::debug!("{} showed notification {:?}", worker.id(), id);
                "Notification sent.".to_string()
            }
            Err(err) => err.to_string(),
        }
    }
}
