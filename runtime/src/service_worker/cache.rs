//! Cache API Implementation
//!
//! Named cache generations holding request/response pairs. The store is
//! passive: which generation exists, and what goes into it, is decided by the
//! lifecycle and the fetch strategies.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::try_join_all;
use spin::RwLock;
use thiserror::Error;

use super::fetch::{FetchError, Request, RequestKey, RequestMethod, Response};
use super::network::Network;

/// Cache error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Only GET requests can be stored
    #[error("cannot cache {method} {url}: only GET requests are cacheable")]
    MethodNotCacheable { method: RequestMethod, url: String },
    /// A bulk add received a non-2xx response
    #[error("bulk add of {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
    /// A bulk add could not fetch one of its requests
    #[error("bulk add of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Read/write counters across a [`CacheStorage`] and all its caches.
#[derive(Debug, Default)]
struct CacheCounters {
    lookups: AtomicU64,
    writes: AtomicU64,
}

/// Snapshot of cache traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of entry lookups
    pub lookups: u64,
    /// Number of entries written (puts and bulk adds)
    pub writes: u64,
}

#[derive(Debug)]
struct CacheInner {
    name: String,
    entries: RwLock<BTreeMap<RequestKey, Response>>,
    counters: Arc<CacheCounters>,
}

/// A single cache generation.
///
/// Cheap to clone; clones share the same entries.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

impl Cache {
    fn new(name: &str, counters: Arc<CacheCounters>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                name: name.to_string(),
                entries: RwLock::new(BTreeMap::new()),
                counters,
            }),
        }
    }

    /// Get cache name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Look up the stored response for `request`
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        self.match_key(&request.key())
    }

    /// Look up a GET entry by URL
    pub fn match_url(&self, url: &str) -> Option<Response> {
        self.match_key(&Request::new(url).key())
    }

    fn match_key(&self, key: &RequestKey) -> Option<Response> {
        self.inner.counters.lookups.fetch_add(1, Ordering::Relaxed);
        self.inner
            .entries
            .read()
            .get(key)
            .cloned()
    }

    /// Store `response` for `request`, replacing any previous entry
    pub fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        if request.method != RequestMethod::Get {
            return Err(CacheError::MethodNotCacheable {
                method: request.method,
                url: request.url.clone(),
            });
        }

        self.inner.counters.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.entries.write().insert(request.key(), response);
        log::trace!("cache {}: stored {}", self.inner.name, request.key());
        Ok(())
    }

    /// Fetch every URL and store all responses, or store nothing.
    ///
    /// Fails on the first transport error or non-2xx status; entries are only
    /// written once every fetch has succeeded.
    pub async fn add_all<N, I, S>(&self, network: &N, urls: I) -> Result<(), CacheError>
    where
        N: Network + ?Sized,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requests: Vec<Request> = urls.into_iter().map(Request::new).collect();

        let fetches = requests.iter().map(|request| async move {
            let response = network
                .fetch(request)
                .await
                .map_err(|source| CacheError::Fetch {
                    url: request.url.clone(),
                    source,
                })?;
            if !response.ok() {
                return Err(CacheError::BadStatus {
                    url: request.url.clone(),
                    status: response.status,
                });
            }
            Ok(response)
        });
        let responses = try_join_all(fetches).await?;

        let mut entries = self.inner.entries.write();
        for (request, response) in requests.iter().zip(responses) {
            self.inner.counters.writes.fetch_add(1, Ordering::Relaxed);
            entries.insert(request.key(), response);
        }
        Ok(())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Whether the cache has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache storage (manages multiple named generations)
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: RwLock<BTreeMap<String, Cache>>,
    counters: Arc<CacheCounters>,
}

impl CacheStorage {
    /// Create new cache storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Open or create a cache
    pub fn open(&self, name: &str) -> Cache {
        if let Some(cache) = self.caches.read().get(name) {
            return cache.clone();
        }
        self.caches
            .write()
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("cache storage: created generation {}", name);
                Cache::new(name, self.counters.clone())
            })
            .clone()
    }

    /// Check if a cache exists
    pub fn has(&self, name: &str) -> bool {
        self.caches.read().contains_key(name)
    }

    /// Delete a cache
    pub fn delete(&self, name: &str) -> bool {
        let removed = self.caches.write().remove(name).is_some();
        if removed {
            log::debug!("cache storage: deleted generation {}", name);
        }
        removed
    }

    /// Get all cache names
    pub fn keys(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }

    /// Traffic counters for every cache opened through this storage
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            lookups: self.counters.lookups.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }
}
