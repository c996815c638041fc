//! Caching Strategies
//!
//! Which strategy answers a request, and the two strategies themselves.

use std::sync::Arc;

use super::cache::Cache;
use super::fetch::{FetchResult, FetchSource, Request, RequestMethod, Response};
use super::network::Network;
use super::scope::WorkerGlobalScope;

/// How an intercepted request is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    /// Try network first; on failure fall back to cache, then to the offline page.
    NetworkFirst,
    /// Serve stale from cache immediately, update cache in background.
    StaleWhileRevalidate,
}

/// Pick the strategy for `request`, or `None` to leave it alone.
///
/// Only GET is intercepted: navigations go network-first, everything else
/// stale-while-revalidate.
pub fn select_strategy(request: &Request) -> Option<CacheStrategy> {
    if request.method != RequestMethod::Get {
        return None;
    }
    if request.is_navigation() {
        Some(CacheStrategy::NetworkFirst)
    } else {
        Some(CacheStrategy::StaleWhileRevalidate)
    }
}

/// Run `strategy` for `request`
pub async fn apply_strategy(
    strategy: CacheStrategy,
    scope: WorkerGlobalScope,
    request: Request,
) -> FetchResult {
    match strategy {
        CacheStrategy::NetworkFirst => network_first(&scope, &request).await,
        CacheStrategy::StaleWhileRevalidate => stale_while_revalidate(&scope, request).await,
    }
}

/// Network-first with cache and offline-page fallback.
///
/// A live response is written through to the current generation before it is
/// returned. On any network error the cached copy is served, and failing
/// that the offline page.
pub async fn network_first(scope: &WorkerGlobalScope, request: &Request) -> FetchResult {
    let cache = scope.current_cache();

    match scope.network().fetch(request).await {
        Ok(response) => {
            store(&cache, request, &response);
            FetchResult::Response(response, FetchSource::Network)
        }
        Err(err) => {
            log::debug!("network-first {}: {}, trying cache", request.url, err);
            if let Some(cached) = cache.match_request(request) {
                return FetchResult::Response(cached, FetchSource::Cache);
            }
            match cache.match_url(&scope.config().offline_path) {
                Some(offline) => FetchResult::Response(offline, FetchSource::Fallback),
                None => {
                    log::warn!(
                        "network-first {}: offline page {} missing from {}",
                        request.url,
                        scope.config().offline_path,
                        cache.name()
                    );
                    FetchResult::NoResponse
                }
            }
        }
    }
}

/// Stale-while-revalidate.
///
/// With a cached copy: return it at once and refresh the entry in the
/// background. Without one: wait for the network, store and return its
/// response, or return nothing if the network fails too.
pub async fn stale_while_revalidate(scope: &WorkerGlobalScope, request: Request) -> FetchResult {
    let cache = scope.current_cache();
    let cached = cache.match_request(&request);
    let network = scope.network().clone();

    match cached {
        Some(cached) => {
            scope
                .background()
                .spawn(async move {
                    revalidate(network, cache, request).await;
                });
            FetchResult::Response(cached, FetchSource::Cache)
        }
        None => match revalidate(network, cache, request).await {
            Some(fresh) => FetchResult::Response(fresh, FetchSource::Network),
            None => FetchResult::NoResponse,
        },
    }
}

/// Fetch `request` and store the response; `None` if the network failed
async fn revalidate(network: Arc<dyn Network>, cache: Cache, request: Request) -> Option<Response> {
    match network.fetch(&request).await {
        Ok(fresh) => {
            store(&cache, &request, &fresh);
            Some(fresh)
        }
        Err(err) => {
            log::debug!("revalidate {}: {}", request.url, err);
            None
        }
    }
}

fn store(cache: &Cache, request: &Request, response: &Response) {
    if let Err(err) = cache.put(request, response.clone()) {
        log::warn!("could not cache {}: {}", request.url, err);
    }
}
