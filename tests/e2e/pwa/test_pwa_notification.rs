//! E2E Test: PWA Notifications
//!
//! Tests the local notification round trip:
//! 1. Page asks for permission and sends a notification via the worker
//! 2. User clicks the notification
//! 3. Worker focuses an open page or opens a new one

use pwa_lab_browser::pwa::{
    FixedPermission, NotificationBridge, NotificationPermission, NOTIFICATION_ICON,
};
use pwa_lab_e2e_tests::*;
use pwa_lab_runtime::service_worker::{Notification, WorkerConfig};

#[tokio::test]
async fn test_send_and_click_focuses_open_page() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    let page = container.open_page("/index.html");
    let other = container.open_page("/styles.css");
    container.clients().focus(other).unwrap();

    let mut bridge = NotificationBridge::new(true);
    let status = bridge.send_local_notification(
        &mut FixedPermission(NotificationPermission::Granted),
        &container,
    );
    assert_eq!(status, "Notification sent.");

    let worker = container.controller().unwrap();
    let shown = worker.scope().notifications().get_all();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].notification.badge.as_deref(), Some(NOTIFICATION_ICON));

    worker.notification_click(shown[0].id, None).await.unwrap();
    assert!(worker.scope().notifications().get_all().is_empty());
    // first in-scope window is brought forward; no new window
    assert_eq!(container.clients().focused().unwrap().id, page);
    assert_eq!(container.clients().len(), 2);
}

#[tokio::test]
async fn test_click_without_pages_opens_target_url() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    let worker = container.controller().unwrap();

    let id = worker
        .show_notification(Notification::new("Reminder").with_url("/index.html"))
        .unwrap();
    worker.notification_click(id, Some("open".to_string())).await.unwrap();

    let opened = container.clients().focused().unwrap();
    assert_eq!(opened.url, "/index.html");
    assert_eq!(opened.controller, Some(worker.id()));
}

#[tokio::test]
async fn test_click_on_dismissed_notification() {
    let site = pwa_site();
    let container = registered(&site, WorkerConfig::default()).await;
    let worker = container.controller().unwrap();

    let id = worker.show_notification(Notification::new("Gone")).unwrap();
    assert!(worker.scope().notifications().close(id));
    assert!(worker.notification_click(id, None).await.is_err());
    assert!(container.clients().is_empty());
}

#[tokio::test]
async fn test_notification_payload_from_json() {
    let payload = r#"{
        "title": "PWA Lab",
        "body": "Local notification delivered via Service Worker.",
        "icon": "/assets/icons/icon-192.svg",
        "badge": "/assets/icons/icon-192.svg",
        "data": { "url": "/" }
    }"#;
    let parsed: Notification = serde_json::from_str(payload).unwrap();
    assert_eq!(parsed, NotificationBridge::demo_notification());
}

#[test]
fn test_denied_permission_sends_nothing() {
    let site = pwa_site();
    let container = pwa_lab_runtime::ServiceWorkerContainer::new(ORIGIN, site);
    let mut bridge = NotificationBridge::new(true);
    let status = bridge.send_local_notification(
        &mut FixedPermission(NotificationPermission::Denied),
        &container,
    );
    assert_eq!(status, "Permission denied.");
    assert_eq!(bridge.permission(), NotificationPermission::Denied);
}
