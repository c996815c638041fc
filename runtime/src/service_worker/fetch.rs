//! Fetch Model
//!
//! Requests, responses and the cache identity of a request, as seen by the
//! service worker when it intercepts page traffic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RequestMethod {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl RequestMethod {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "OPTIONS" => Ok(Self::Options),
            other => Err(FetchError::InvalidMethod(other.to_string())),
        }
    }
}

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Same-origin only
    SameOrigin,
    /// No CORS
    NoCors,
    /// CORS
    #[default]
    Cors,
    /// Top-level page load
    Navigate,
}

/// Errors produced while fetching from the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The network is unreachable.
    #[error("network is offline")]
    Offline,
    /// Transport-level failure (DNS, connection reset, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
    /// The request URL could not be resolved against the origin.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Unknown request method string.
    #[error("invalid request method: {0}")]
    InvalidMethod(String),
    /// The controlling worker intercepted the request but had nothing to answer with.
    #[error("service worker produced no response for {0}")]
    NoResponse(String),
}

/// Fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request URL (origin-relative path or absolute URL)
    pub url: String,
    /// HTTP method
    pub method: RequestMethod,
    /// Request mode
    pub mode: RequestMode,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body (if any)
    pub body: Option<Bytes>,
}

impl Request {
    /// Create a new GET request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            mode: RequestMode::Cors,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a navigation (full page load) request
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(url).with_mode(RequestMode::Navigate)
    }

    /// Set the method
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether this is a top-level navigation
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache identity of this request
    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method,
            url: self.url.clone(),
        }
    }
}

/// Identity under which a response is stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    pub method: RequestMethod,
    pub url: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Fetch response
///
/// The body is a [`Bytes`] handle, so cloning a response is a cheap snapshot
/// and a stored copy never observes later changes to the one handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was produced for
    pub url: String,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Bytes,
}

impl Response {
    /// Create a new empty response
    pub fn new(status: u16) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a response carrying `body`
    pub fn with_body(status: u16, body: impl Into<Bytes>) -> Self {
        let mut response = Self::new(status);
        response.body = body.into();
        response
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check if response is OK
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Live network response.
    Network,
    /// Stored entry for the same request.
    Cache,
    /// The offline fallback page.
    Fallback,
}

/// Result of handing a request to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Not intercepted; the caller fetches from the network itself.
    Passthrough,
    /// Intercepted and answered.
    Response(Response, FetchSource),
    /// Intercepted, but neither cache nor network had anything.
    NoResponse,
}

impl FetchResult {
    /// The response, if the worker produced one
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response(response, _) => Some(response),
            _ => None,
        }
    }

    /// Consume into the response, if any
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Response(response, _) => Some(response),
            _ => None,
        }
    }

    /// Where the response came from, if any
    pub fn source(&self) -> Option<FetchSource> {
        match self {
            Self::Response(_, source) => Some(*source),
            _ => None,
        }
    }
}
