//! Shared test utilities for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use agentic_a2a::builders::AgentCardBuilder;
use agentic_a2a::client::{FetchError, HttpFetch, HttpRequest, HttpResponse};
use agentic_a2a::types::AgentCard;
use async_trait::async_trait;
use serde_json::{json, Value};

/// An [`HttpFetch`] that answers from a script and records every request.
///
/// Scripted responses are used in order; once they run out, the fallback
/// (if any) answers every further request.
#[derive(Default)]
pub struct ScriptedFetch {
    script: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
    fallback: Option<(u16, String)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a single-chunk body.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.respond_with(HttpResponse::from_bytes(status, body.into()))
    }

    /// Queue a prepared response.
    pub fn respond_with(self, response: HttpResponse) -> Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a network failure.
    pub fn fail(self, error: FetchError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Answer every unscripted request with this status and body.
    pub fn fallback(mut self, status: u16, body: impl Into<String>) -> Self {
        self.fallback = Some((status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The JSON body of the `index`-th request.
    pub fn request_json(&self, index: usize) -> Value {
        let requests = self.requests.lock().unwrap();
        let body = requests[index].body.as_ref().expect("request has a body");
        serde_json::from_slice(body).expect("request body is JSON")
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(request);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some((status, body)) => Ok(HttpResponse::from_bytes(*status, body.clone())),
            None => Err(FetchError::Other("no scripted response left".into())),
        }
    }
}

/// A JSON-RPC success envelope.
pub fn rpc_result(result: Value) -> String {
    json!({"jsonrpc": "2.0", "id": "1", "result": result}).to_string()
}

/// A JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str) -> String {
    json!({"jsonrpc": "2.0", "id": "1", "error": {"code": code, "message": message}}).to_string()
}

/// One SSE message carrying `envelope` as its data.
pub fn sse_message(envelope: &Value) -> String {
    format!("data: {}\n\n", envelope)
}

/// A task in the given state, as the agent would send it.
pub fn task_json(id: &str, state: &str) -> Value {
    json!({
        "id": id,
        "sessionId": "session-1",
        "status": {
            "state": state,
            "message": {"role": "agent", "parts": [{"type": "text", "text": "on it"}]},
            "timestamp": "2025-04-01T12:00:00Z"
        },
        "artifacts": null,
        "metadata": null
    })
}

/// A status update event for `id`.
pub fn status_event(id: &str, state: &str, is_final: bool) -> Value {
    json!({
        "id": id,
        "status": {"state": state},
        "final": is_final
    })
}

/// An artifact update event for `id`.
pub fn artifact_event(id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "artifact": {"name": "output", "parts": [{"type": "text", "text": text}], "index": 0}
    })
}

/// Build a default agent card for testing.
pub fn test_agent_card(url: &str) -> AgentCard {
    AgentCardBuilder::new("Test Coder", "0.1.0")
        .with_description("A coding agent for testing")
        .with_url(url)
        .with_streaming(true)
        .with_skill("code", "Code", "Writes code", vec!["test".to_string()])
        .build()
}

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Serve `app` on a random local port. Returns the base URL and a handle to shut it down.
pub async fn start_test_server(app: axum::Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (base_url, handle)
}
