//! PWA Lab Runtime
//!
//! This crate provides the service worker runtime behind the PWA Lab demo:
//! an offline-first worker that pre-caches the app shell, keeps exactly one
//! cache generation alive, and answers page requests from network or cache.
//!
//! # Architecture
//!
//! - `service_worker::cache`: named cache generations (`CacheStorage`, `Cache`)
//! - `service_worker::fetch`: request/response model and cache identity
//! - `service_worker::network`: `Network` seam (in-memory origin, reqwest backend)
//! - `service_worker::events`: extendable events and the event dispatcher
//! - `service_worker::lifecycle`: state machine, pre-cache and generation cleanup
//! - `service_worker::strategy`: network-first and stale-while-revalidate
//! - `service_worker::worker`: the worker's event handlers
//! - `service_worker::registration`: page-side container and registration
//! - `service_worker::clients` / `notification`: window clients and notifications

pub mod service_worker;

pub use service_worker::{
    CacheStorage, FetchError, FetchResult, FetchSource, Network, Notification, Request,
    RequestMethod, Response, ServiceWorker, ServiceWorkerContainer, ServiceWorkerError,
    StaticNetwork, WorkerConfig,
};

/// Runtime version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
