//! Progressive Web App (PWA) Support
//!
//! Page side of the PWA Lab demo. The offline behaviour itself lives in the
//! service worker runtime; this module covers what the page does with it:
//! capability detection, install prompt, notifications, persistence, share.

pub mod capabilities;
pub mod demo;
pub mod install;
pub mod notification_bridge;
pub mod share;
pub mod web_storage;

pub use capabilities::*;
pub use demo::*;
pub use install::*;
pub use notification_bridge::*;
pub use share::*;
pub use web_storage::{KeyValueStore, StorageError, DB_NAME, LAST_SAVED_KEY, STORE_NAME};
