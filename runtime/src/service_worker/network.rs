//! Network Access
//!
//! The worker never talks to a socket directly; it goes through a
//! [`Network`] implementation so the same interception logic runs against
//! an in-memory origin (demo, tests) or a real HTTP origin.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use spin::{Mutex, RwLock};

use super::fetch::{FetchError, Request, RequestMethod, Response};

/// Something that can satisfy a request from the network.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch `request` from the network.
    ///
    /// Only transport failures are errors; an HTTP error status is still a
    /// successful fetch.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

#[async_trait]
impl<N: Network + ?Sized> Network for Arc<N> {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        (**self).fetch(request).await
    }
}

/// In-memory origin with an online/offline switch.
///
/// Unknown GET paths answer 404, like a static file server would. Every
/// request that reaches the network is recorded, online or not.
#[derive(Default)]
pub struct StaticNetwork {
    routes: RwLock<BTreeMap<String, Response>>,
    offline: AtomicBool,
    failing: RwLock<Vec<String>>,
    log: Mutex<Vec<(RequestMethod, String)>>,
}

impl StaticNetwork {
    /// Create an empty, online network
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `path`
    pub fn route(&self, path: &str, body: impl Into<Bytes>) {
        self.route_response(path, Response::with_body(200, body));
    }

    /// Serve a prepared response at `path`
    pub fn route_response(&self, path: &str, response: Response) {
        self.routes
            .write()
            .insert(path.to_string(), response.with_url(path));
    }

    /// Take the whole network down (or bring it back)
    pub fn set_offline(&self, offline: bool) {
        log::debug!("static network offline={}", offline);
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Whether the network is currently down
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Make fetches of `path` fail with a transport error
    pub fn fail_path(&self, path: &str) {
        self.failing.write().push(path.to_string());
    }

    /// Requests that reached the network, in arrival order
    pub fn requests(&self) -> Vec<(RequestMethod, String)> {
        self.log.lock().clone()
    }

    /// Number of times `path` was requested
    pub fn hits(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|(_, url)| url == path).count()
    }
}

#[async_trait]
impl Network for StaticNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.log.lock().push((request.method, request.url.clone()));

        if self.is_offline() {
            return Err(FetchError::Offline);
        }
        if self.failing.read().iter().any(|p| *p == request.url) {
            return Err(FetchError::Network(format!(
                "connection reset fetching {}",
                request.url
            )));
        }

        let routes = self.routes.read();
        let response = match (request.method, routes.get(&request.url)) {
            (RequestMethod::Get, Some(response)) => response.clone(),
            (RequestMethod::Head, Some(response)) => {
                let mut head = response.clone();
                head.body = Bytes::new();
                head
            }
            (RequestMethod::Get | RequestMethod::Head, None) => {
                Response::new(404).with_url(request.url.clone())
            }
            (_, Some(_)) => Response::new(405).with_url(request.url.clone()),
            (_, None) => Response::new(404).with_url(request.url.clone()),
        };
        Ok(response)
    }
}

#[cfg(feature = "http")]
pub use self::http::HttpNetwork;

#[cfg(feature = "http")]
mod http {
    use super::*;

    /// Network backed by a `reqwest` client against one origin.
    pub struct HttpNetwork {
        client: reqwest::Client,
        origin: String,
    }

    impl HttpNetwork {
        /// Create a network for `origin` (e.g. `http://localhost:8080`)
        pub fn new(origin: impl Into<String>) -> Result<Self, FetchError> {
            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(Self::with_client(client, origin))
        }

        /// Use an existing client
        pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
            let origin = origin.into().trim_end_matches('/').to_string();
            Self { client, origin }
        }

        fn absolute(&self, url: &str) -> Result<String, FetchError> {
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(url.to_string())
            } else if url.starts_with('/') {
                Ok(format!("{}{}", self.origin, url))
            } else {
                Err(FetchError::InvalidUrl(url.to_string()))
            }
        }
    }

    #[async_trait]
    impl Network for HttpNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            let url = self.absolute(&request.url)?;
            let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                .map_err(|_| FetchError::InvalidMethod(request.method.to_string()))?;

            let mut builder = self.client.request(method, &url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let upstream = builder
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let mut response = Response::new(upstream.status().as_u16()).with_url(request.url.clone());
            for (name, value) in upstream.headers() {
                if let Ok(value) = value.to_str() {
                    response.headers.insert(name.to_string(), value.to_string());
                }
            }
            response.body = upstream
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(response)
        }
    }
}
