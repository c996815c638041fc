//! Test assertions
//!
//! Checks on cache generations and on where a response came from.

use pwa_lab_runtime::service_worker::{CacheStorage, FetchResult, FetchSource, Request};

/// Assertion result
pub type AssertResult = Result<(), String>;

/// The storage holds exactly the named generations.
pub fn assert_generations(caches: &CacheStorage, expected: &[&str]) -> AssertResult {
    let mut actual = caches.keys();
    actual.sort();
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    if actual == expected {
        Ok(())
    } else {
        Err(format!("Expected generations {:?}, found {:?}", expected, actual))
    }
}

/// Every URL has an entry in the `generation` cache.
pub fn assert_cached<'a>(
    caches: &CacheStorage,
    generation: &str,
    urls: impl IntoIterator<Item = &'a str>,
) -> AssertResult {
    if !caches.has(generation) {
        return Err(format!("Generation {} does not exist", generation));
    }
    let cache = caches.open(generation);
    let missing: Vec<&str> = urls
        .into_iter()
        .filter(|url| cache.match_request(&Request::new(*url)).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing from {}: {:?}", generation, missing))
    }
}

/// The result is a response from `source`; returns its body.
pub fn assert_served_from(result: &FetchResult, source: FetchSource) -> Result<String, String> {
    match result {
        FetchResult::Response(response, actual) if *actual == source => Ok(response.text()),
        FetchResult::Response(_, actual) => {
            Err(format!("Expected response from {:?}, got {:?}", source, actual))
        }
        other => Err(format!("Expected response from {:?}, got {:?}", source, other)),
    }
}
