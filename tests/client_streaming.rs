//! End-to-end SSE streaming tests against a local axum agent.

mod common;

use std::convert::Infallible;
use std::time::Duration;

use agentic_a2a::client::A2AClient;
use agentic_a2a::error::A2AError;
use agentic_a2a::types::{Message, TaskQueryParams, TaskSendParams, TaskState, TaskStreamEvent};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use common::{artifact_event, init_tracing, sse_message, start_test_server, status_event, task_json};
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;

fn envelope(result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": "1", "result": result})
}

/// Sends on drop, so tests can see when the server stopped streaming.
struct DropSignal(mpsc::UnboundedSender<&'static str>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        let _ = self.0.send("stream dropped");
    }
}

fn sse(chunks: impl futures::Stream<Item = Result<String, Infallible>> + Send + 'static) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(chunks))
        .unwrap()
}

async fn rpc(
    State(dropped): State<mpsc::UnboundedSender<&'static str>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let task_id = request["params"]["id"].as_str().unwrap_or_default().to_string();

    match method.as_str() {
        "tasks/send" => Json(json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "result": task_json(&task_id, "completed")
        }))
        .into_response(),

        "tasks/sendSubscribe" if accept == "text/event-stream" => {
            let id = task_id.clone();
            sse(async_stream::stream! {
                let first = sse_message(&envelope(status_event(&id, "working", false)));
                // Split the first message mid-JSON and the second mid-terminator.
                let (head, tail) = first.split_at(first.len() / 2);
                yield Ok(head.to_string());
                tokio::time::sleep(Duration::from_millis(10)).await;
                yield Ok(tail.to_string());

                let second = sse_message(&envelope(artifact_event(&id, "fn main() {}")));
                yield Ok(second[..second.len() - 1].to_string());
                tokio::time::sleep(Duration::from_millis(10)).await;
                yield Ok(format!(
                    "\n: keepalive\n\n{}",
                    sse_message(&envelope(status_event(&id, "completed", true)))
                ));
            })
        }

        "tasks/resubscribe" if task_id == "missing" => {
            (StatusCode::NOT_FOUND, "no such task").into_response()
        }

        "tasks/resubscribe" if task_id == "broken" => {
            let id = task_id.clone();
            sse(async_stream::stream! {
                yield Ok(sse_message(&envelope(status_event(&id, "working", false))));
                yield Ok("data: {not json}\n\n".to_string());
                yield Ok(sse_message(&json!({
                    "jsonrpc": "2.0",
                    "id": "1",
                    "error": {"code": -32001, "message": "Task not found"}
                })));
                yield Ok(sse_message(&envelope(status_event(&id, "completed", true))));
            })
        }

        "tasks/resubscribe" => {
            let id = task_id.clone();
            sse(async_stream::stream! {
                let _signal = DropSignal(dropped);
                let mut interval = tokio::time::interval(Duration::from_millis(20));
                loop {
                    interval.tick().await;
                    yield Ok(sse_message(&envelope(status_event(&id, "working", false))));
                }
            })
        }

        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"code": -32601, "message": "Method not found"}
        }))
        .into_response(),
    }
}

async fn start_agent() -> (String, mpsc::UnboundedReceiver<&'static str>) {
    init_tracing();
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route("/rpc", post(rpc)).with_state(tx);
    let (base_url, _handle) = start_test_server(app).await;
    (format!("{base_url}/rpc"), rx)
}

#[tokio::test]
async fn send_task_subscribe_streams_events_in_order() {
    let (url, _dropped) = start_agent().await;
    let client = A2AClient::new(url);

    let params = TaskSendParams::new("task-7", Message::user_text("write main"));
    let stream = client.send_task_subscribe(params).await.unwrap();
    let events: Vec<TaskStreamEvent> = stream.map(Result::unwrap).collect().await;

    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.task_id() == "task-7"));
    match &events[0] {
        TaskStreamEvent::StatusUpdate(update) => {
            assert_eq!(update.status.state, TaskState::Working);
            assert!(!update.r#final);
        }
        other => panic!("expected status update, got {other:?}"),
    }
    match &events[1] {
        TaskStreamEvent::ArtifactUpdate(update) => {
            assert_eq!(update.artifact.parts[0].as_text(), Some("fn main() {}"));
        }
        other => panic!("expected artifact update, got {other:?}"),
    }
    assert!(events[2].is_final());
}

#[tokio::test]
async fn error_envelope_ends_the_stream() {
    let (url, _dropped) = start_agent().await;
    let client = A2AClient::new(url);

    let mut stream = client
        .resubscribe_task(TaskQueryParams::new("broken"))
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.task_id(), "broken");

    // The malformed message is skipped; the error ends the stream.
    match stream.next().await {
        Some(Err(A2AError::Rpc(rpc))) => {
            assert_eq!(rpc.code, -32001);
            assert_eq!(rpc.message, "Task not found");
        }
        other => panic!("expected RPC error, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn http_error_fails_before_streaming() {
    let (url, _dropped) = start_agent().await;
    let client = A2AClient::new(url);

    let err = client
        .resubscribe_task(TaskQueryParams::new("missing"))
        .await
        .unwrap_err();
    match err {
        A2AError::Http {
            status,
            reason,
            body,
        } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
            assert_eq!(body, "no such task");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_stream_releases_the_connection() {
    let (url, mut dropped) = start_agent().await;
    let client = A2AClient::new(url);

    let mut stream = client
        .resubscribe_task(TaskQueryParams::new("live"))
        .await
        .unwrap();
    for _ in 0..2 {
        let event = stream.next().await.unwrap().unwrap();
        assert!(!event.is_final());
    }
    drop(stream);

    let signal = tokio::time::timeout(Duration::from_secs(5), dropped.recv())
        .await
        .expect("server stream should stop after the client goes away");
    assert_eq!(signal, Some("stream dropped"));
}

#[tokio::test]
async fn json_methods_share_the_endpoint() {
    let (url, _dropped) = start_agent().await;
    let client = A2AClient::new(format!("{url}/"));

    let task = client.send_text("hello").await.unwrap().unwrap();
    assert_eq!(task.status.state, TaskState::Completed);
    assert!(uuid::Uuid::parse_str(&task.id).is_ok());

    let err = client
        .get_task_push_notification(agentic_a2a::types::TaskIdParams::new("t"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), -32601);
}
