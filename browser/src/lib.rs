//! PWA Lab Browser
//!
//! The demo page driven against the service worker runtime.

pub mod pwa;

pub use pwa_lab_runtime as runtime;
