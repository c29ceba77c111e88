//! JSON-RPC 2.0 over HTTP: request dispatch, 401 re-authentication, and
//! response handling for both plain JSON and SSE responses.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::error::{A2AError, A2AResult, RpcError};
use crate::types::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};

use super::auth::AuthenticationHandler;
use super::sse::SseStream;
use super::transport::{HttpFetch, HttpRequest, HttpResponse};

/// Expected response representation, sent as the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptMode {
    /// `application/json`: a single JSON-RPC response.
    Json,
    /// `text/event-stream`: a stream of JSON-RPC responses.
    EventStream,
}

impl AcceptMode {
    /// The MIME type for the `Accept` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptMode::Json => "application/json",
            AcceptMode::EventStream => "text/event-stream",
        }
    }
}

/// Low-level JSON-RPC client bound to one agent endpoint.
///
/// Cheap to clone; clones share the fetcher and the authentication handler.
/// Holds no per-call state, so concurrent calls do not interact.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use agentic_a2a::client::{JsonRpcClient, ReqwestFetch};
/// use agentic_a2a::types::{methods, Task, TaskQueryParams};
///
/// # async fn example() -> agentic_a2a::A2AResult<()> {
/// let rpc = JsonRpcClient::new("http://localhost:3003/users/2/coder/", Arc::new(ReqwestFetch::new()));
/// let task: Option<Task> = rpc.call(methods::GET_TASK, &TaskQueryParams::new("task-1")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JsonRpcClient {
    base_url: String,
    fetch: Arc<dyn HttpFetch>,
    auth: Option<Arc<dyn AuthenticationHandler>>,
}

impl fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

impl JsonRpcClient {
    /// Create a client posting to `base_url`. A single trailing `/` is removed.
    pub fn new(base_url: impl Into<String>, fetch: Arc<dyn HttpFetch>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            fetch,
            auth: None,
        }
    }

    /// Attach an authentication handler (builder-style).
    pub fn with_auth_handler(mut self, handler: Arc<dyn AuthenticationHandler>) -> Self {
        self.auth = Some(handler);
        self
    }

    /// The endpoint every request is posted to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a fresh JSON-RPC request and return the raw HTTP response.
    ///
    /// The request gets a new UUID v4 id. On `401` with a handler configured,
    /// [`AuthenticationHandler::process_401`] decides whether the identical
    /// body is sent once more; the headers are rebuilt for the retry. If
    /// the handler declines, the `401` response is returned as-is.
    ///
    /// # Errors
    ///
    /// Network failures become an [`RpcError`] with code `-32603`. Errors from
    /// the handler propagate unchanged.
    pub async fn make_http_request<P>(
        &self,
        method: &str,
        params: &P,
        accept: AcceptMode,
    ) -> A2AResult<HttpResponse>
    where
        P: Serialize + ?Sized,
    {
        let params = serde_json::to_value(params).map_err(|e| {
            RpcError::internal(format!("Failed to serialize params for {method}: {e}"))
        })?;
        let request = JsonRpcRequest::new(method, Some(params));
        let body = Bytes::from(serde_json::to_vec(&request).map_err(|e| {
            RpcError::internal(format!("Failed to serialize request for {method}: {e}"))
        })?);

        tracing::debug!(
            "sending {} (id {}) to {} accepting {}",
            method,
            request.id,
            self.base_url,
            accept.as_str()
        );

        let mut response = self.send_once(body.clone(), accept).await?;

        if response.status() == 401 {
            if let Some(auth) = &self.auth {
                if auth.process_401(&mut response).await? {
                    tracing::debug!("retrying {} (id {}) after 401", method, request.id);
                    response = self.send_once(body, accept).await?;
                    if response.is_success() {
                        auth.on_success().await?;
                    }
                }
            }
        }

        Ok(response)
    }

    async fn send_once(&self, body: Bytes, accept: AcceptMode) -> A2AResult<HttpResponse> {
        let mut request = HttpRequest::post(self.base_url.as_str(), body)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", accept.as_str());
        if let Some(auth) = &self.auth {
            for (name, value) in auth.headers() {
                request = request.with_header(name, value);
            }
        }

        self.fetch.fetch(request).await.map_err(|e| {
            tracing::error!("network error during RPC call to {}: {}", self.base_url, e);
            A2AError::Rpc(
                RpcError::internal(format!("Network error: {e}"))
                    .with_data(json!({ "cause": e.to_string() })),
            )
        })
    }

    /// Read a plain JSON-RPC response and extract its `result`.
    ///
    /// Returns `Ok(None)` when the envelope has no `result` member. A present
    /// `null` is handed to `T`, so `T = Option<_>` or `serde_json::Value`
    /// can tell it apart from an absent result.
    ///
    /// # Errors
    ///
    /// Always an [`A2AError::Rpc`]: the agent's error relayed verbatim, or a
    /// `-32603` error for HTTP failures, malformed envelopes and results that
    /// do not match `T`.
    pub async fn handle_json_response<T>(
        &self,
        mut response: HttpResponse,
        method: &str,
    ) -> A2AResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        read_json_result(&mut response).await.map_err(|error| {
            tracing::error!(
                "error processing RPC response for method {}: {}",
                method,
                error
            );
            A2AError::Rpc(error)
        })
    }

    /// Turn an event-stream response into a stream of `result` payloads.
    ///
    /// Must be called within a tokio runtime; the body is read by a spawned
    /// task. See [`SseStream`] for per-message behavior.
    ///
    /// # Errors
    ///
    /// [`A2AError::Http`] if the status is not 2xx or there is no body.
    pub async fn handle_sse_response<T>(
        &self,
        mut response: HttpResponse,
        method: &str,
    ) -> A2AResult<SseStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        if response.is_success() {
            if let Some(body) = response.take_body() {
                tracing::debug!("SSE stream opened for method {}", method);
                return Ok(SseStream::from_body(body, method));
            }
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            "HTTP error {} received for streaming method {}: {}",
            response.status_line(),
            method,
            body
        );
        Err(A2AError::Http {
            status: response.status(),
            reason: response.reason().to_string(),
            body,
        })
    }

    /// Send a request and extract its `result` from a JSON response.
    pub async fn call<P, T>(&self, method: &str, params: &P) -> A2AResult<Option<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .make_http_request(method, params, AcceptMode::Json)
            .await?;
        self.handle_json_response(response, method).await
    }

    /// Send a request and stream the `result` of every SSE message.
    pub async fn subscribe<P, T>(&self, method: &str, params: &P) -> A2AResult<SseStream<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let response = self
            .make_http_request(method, params, AcceptMode::EventStream)
            .await?;
        self.handle_sse_response(response, method).await
    }
}

/// Read the body of a plain JSON-RPC response and extract its `result`.
async fn read_json_result<T: DeserializeOwned>(
    response: &mut HttpResponse,
) -> Result<Option<T>, RpcError> {
    let text = response
        .text()
        .await
        .map_err(|e| RpcError::internal(format!("Failed to process response: {e}")))?;

    if !response.is_success() {
        if let Ok(JsonRpcResponse {
            error: Some(error), ..
        }) = parse_envelope(&text)
        {
            return Err(error);
        }
        let message = if text.is_empty() {
            format!(
                "Failed to process response: HTTP error {}",
                response.status_line()
            )
        } else {
            format!(
                "Failed to process response: HTTP error {} - {}",
                response.status_line(),
                text
            )
        };
        return Err(RpcError::internal(message)
            .with_data(json!({ "status": response.status(), "body": text })));
    }

    let envelope = parse_envelope(&text)?;
    if let Some(error) = envelope.error {
        return Err(error);
    }
    match envelope.result {
        None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RpcError::internal(format!("Failed to process response: {e}"))),
    }
}

/// Parse and structurally validate a JSON-RPC 2.0 response envelope.
pub(crate) fn parse_envelope(text: &str) -> Result<JsonRpcResponse, RpcError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RpcError::internal(format!("Failed to process response: {e}")))?;

    let valid = value
        .as_object()
        .and_then(|object| object.get("jsonrpc"))
        .and_then(|version| version.as_str())
        == Some(JSONRPC_VERSION);
    if !valid {
        return Err(RpcError::internal(
            "Invalid JSON-RPC response structure received from server.",
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| RpcError::internal(format!("Failed to process response: {e}")))
}
