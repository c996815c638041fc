//! PWA Lab End-to-End Testing Framework
//!
//! Shared fixtures and assertions for the end-to-end suites under `pwa/`.
//! Each suite drives a `ServiceWorkerContainer` against an in-memory origin
//! and checks what a page would observe.

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
