//! HTTP layer underneath the JSON-RPC client.
//!
//! Provides the [`HttpFetch`] trait, the injectable network function the rest
//! of the client is written against, and [`ReqwestFetch`], its standard
//! implementation. Tests substitute their own `HttpFetch` to script responses.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

/// A response body delivered chunk by chunk.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// A failure to complete an HTTP exchange (no status was received, or the
/// body could not be read).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The connection could not be established (refused, DNS, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request or body read timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// HTTP methods used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Document fetches during discovery.
    Get,
    /// JSON-RPC calls.
    Post,
}

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Target URL.
    pub url: String,
    /// Header name/value pairs, in the order they should be applied.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// A GET request without headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A POST request with the given body.
    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    /// Append a header (builder-style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the last header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response whose body has not been read yet.
pub struct HttpResponse {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Option<BodyStream>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

impl HttpResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Option<BodyStream>) -> Self {
        Self {
            status,
            reason: String::new(),
            headers,
            body,
        }
    }

    /// A response whose body is delivered as a single chunk.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        Self::from_chunks(status, vec![body.into()])
    }

    /// A response whose body is delivered as the given chunks, in order.
    pub fn from_chunks(status: u16, chunks: Vec<Bytes>) -> Self {
        let body = stream::iter(chunks.into_iter().map(Ok));
        Self::new(status, Vec::new(), Some(Box::pin(body)))
    }

    /// Set the reason phrase (builder-style).
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Append a header (builder-style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase; empty if the fetcher did not supply one.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a body is still available to read.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Take the body stream, leaving the response without one.
    pub fn take_body(&mut self) -> Option<BodyStream> {
        self.body.take()
    }

    /// Read the whole body as text, consuming it. Invalid UTF-8 is replaced.
    ///
    /// Returns an empty string if the body was already taken.
    pub async fn text(&mut self) -> Result<String, FetchError> {
        let Some(mut body) = self.body.take() else {
            return Ok(String::new());
        };
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// `"<status> <reason>"`, or just the status when the reason is unknown.
    pub(crate) fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

/// The network function the client issues every request through.
///
/// Implementations must be safe to call concurrently. They report a
/// response for every HTTP status, including 4xx/5xx; only failures to
/// obtain a response at all are `Err`.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Perform one HTTP exchange.
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Configuration for [`ReqwestFetch`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Connection establishment timeout. Defaults to 10 seconds.
    pub connect_timeout: Duration,
    /// Total request timeout, including reading the body. `None` (the
    /// default) leaves long-lived SSE streams open indefinitely.
    pub timeout: Option<Duration>,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: None,
            headers: HashMap::new(),
        }
    }
}

/// [`HttpFetch`] over a `reqwest::Client`.
///
/// # Example
///
/// ```no_run
/// use agentic_a2a::client::{FetchConfig, ReqwestFetch};
/// use std::time::Duration;
///
/// let fetch = ReqwestFetch::with_config(FetchConfig {
///     timeout: Some(Duration::from_secs(30)),
///     ..FetchConfig::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Create a fetcher with default configuration.
    pub fn new() -> Self {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with custom configuration.
    ///
    /// Headers whose name or value is not valid HTTP are skipped.
    pub fn with_config(config: FetchConfig) -> Self {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &config.headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    default_headers.insert(name, val);
                }
                _ => tracing::warn!("skipping invalid default header {:?}", key),
            }
        }

        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("failed to build configured HTTP client, using defaults: {e}");
            reqwest::Client::new()
        });

        Self { client }
    }

    /// Create a fetcher over an existing `reqwest::Client`.
    ///
    /// Useful when you want to share a connection pool or configure TLS
    /// settings externally.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let url = Url::parse(&request.url)
            .map_err(|e| FetchError::Other(format!("invalid URL {}: {e}", request.url)))?;

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes_stream().map(|chunk| chunk.map_err(map_reqwest_error));

        Ok(
            HttpResponse::new(status.as_u16(), headers, Some(Box::pin(body)))
                .with_reason(status.canonical_reason().unwrap_or_default()),
        )
    }
}
