//! Server-Sent Events (SSE) handling for streaming JSON-RPC responses.
//!
//! [`SseDecoder`] turns body chunks into complete SSE messages (blank-line
//! delimited). Each message's `data` is parsed as a JSON-RPC envelope; its
//! `result` is yielded, malformed messages are skipped, and an `error`
//! envelope ends the stream. [`SseStream`] runs that loop on a background
//! task and hands results to the consumer through a channel.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::error::{A2AError, A2AResult, RpcError};

use super::json_rpc::parse_envelope;
use super::transport::BodyStream;

/// Buffered events between the reader task and the consumer.
const CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Framing
// ============================================================================

/// Incremental SSE framer.
///
/// Bytes are decoded as UTF-8 (a multi-byte sequence split across chunks is
/// carried over; invalid sequences become U+FFFD), carriage returns are
/// dropped, and the text is split on blank lines. A trailing partial message
/// stays buffered until more input arrives.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    pending: Vec<u8>,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every message it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let text = decode_utf8(&mut self.pending);
        self.buffer.push_str(&text);
        if self.buffer.contains('\r') {
            self.buffer.retain(|c| c != '\r');
        }

        let mut messages = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            messages.push(self.buffer[..pos].to_string());
            self.buffer.drain(..pos + 2);
        }
        messages
    }

    /// End of input: return the unterminated remainder, if it holds anything
    /// other than whitespace.
    pub fn finish(mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.buffer.push_str(&String::from_utf8_lossy(&self.pending));
        }
        if self.buffer.trim().is_empty() {
            None
        } else {
            Some(self.buffer)
        }
    }
}

/// Decode the longest valid prefix of `pending`, leaving an incomplete
/// trailing sequence in place.
fn decode_utf8(pending: &mut Vec<u8>) -> String {
    let mut out = String::new();
    loop {
        match std::str::from_utf8(pending) {
            Ok(text) => {
                out.push_str(text);
                pending.clear();
                return out;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&pending[..valid]));
                match e.error_len() {
                    None => {
                        pending.drain(..valid);
                        return out;
                    }
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        pending.drain(..valid + len);
                    }
                }
            }
        }
    }
}

/// The fields of one SSE message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field.
    pub event: Option<String>,
    /// `id:` field.
    pub id: Option<String>,
    /// `retry:` field, when it is a valid integer.
    pub retry: Option<u64>,
    /// `data:` lines joined with `\n`; `None` if the message had none.
    pub data: Option<String>,
}

impl SseEvent {
    /// Parse one message (without its terminating blank line).
    ///
    /// Comment lines (leading `:`) and unknown fields are ignored. One space
    /// after the field colon is stripped, per the SSE format.
    pub fn parse(message: &str) -> Self {
        let mut event = SseEvent::default();
        let mut data: Vec<&str> = Vec::new();

        for line in message.split('\n') {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "data" => data.push(value),
                "event" => event.event = Some(value.to_string()),
                "id" => event.id = Some(value.to_string()),
                "retry" => event.retry = value.trim().parse().ok(),
                _ => {}
            }
        }

        if !data.is_empty() {
            event.data = Some(data.join("\n"));
        }
        event
    }

    fn has_metadata(&self) -> bool {
        self.event.is_some() || self.id.is_some() || self.retry.is_some()
    }
}

/// What to do with one SSE message.
#[derive(Debug)]
enum Outcome<T> {
    Yield(T),
    Skip,
    Abort(RpcError),
}

/// Interpret one SSE message as a JSON-RPC envelope carrying a `T`.
fn interpret<T: DeserializeOwned>(message: &str, method: &str) -> Outcome<T> {
    let event = SseEvent::parse(message);
    if event.has_metadata() {
        tracing::trace!(
            "SSE fields for method {}: event={:?} id={:?} retry={:?}",
            method,
            event.event,
            event.id,
            event.retry,
        );
    }

    let Some(data) = event.data else {
        return Outcome::Skip;
    };
    let data = data.trim();
    if data.is_empty() {
        return Outcome::Skip;
    }

    let envelope = match parse_envelope(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(
                "invalid SSE data received for method {}: {} (data: {})",
                method,
                e.message,
                data
            );
            return Outcome::Skip;
        }
    };

    if let Some(error) = envelope.error {
        tracing::error!(
            "error received in SSE stream for method {}: {} {}",
            method,
            error.code,
            error.message
        );
        return Outcome::Abort(error);
    }

    match envelope.result {
        Some(result) => match serde_json::from_value(result) {
            Ok(value) => Outcome::Yield(value),
            Err(e) => {
                tracing::error!(
                    "SSE result for method {} has an unexpected shape: {} (data: {})",
                    method,
                    e,
                    data
                );
                Outcome::Skip
            }
        },
        None => {
            tracing::warn!(
                "SSE data for method {} has neither result nor error: {}",
                method,
                data
            );
            Outcome::Skip
        }
    }
}

// ============================================================================
// Stream
// ============================================================================

/// A lazy, forward-only sequence of streamed `result` payloads.
///
/// Yields `Ok(T)` per result in wire order. Ends with `None` when the server
/// closes the stream, or after a single `Err` when the server sends a
/// JSON-RPC error or the body cannot be read. Not restartable; reconnect with
/// a new subscribe or resubscribe call.
///
/// Dropping the stream stops the background reader and releases the
/// connection.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: agentic_a2a::client::SseStream<agentic_a2a::TaskStreamEvent>) {
/// while let Some(event) = stream.next().await {
///     match event {
///         Ok(update) => println!("update for task {}", update.task_id()),
///         Err(e) => eprintln!("stream error: {}", e),
///     }
/// }
/// # }
/// ```
pub struct SseStream<T> {
    receiver: mpsc::Receiver<A2AResult<T>>,
    task: tokio::task::JoinHandle<()>,
}

impl<T> fmt::Debug for SseStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseStream")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl<T> SseStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Start reading an SSE body.
    ///
    /// Spawns the reader on the current tokio runtime; `method` only labels
    /// log lines.
    pub fn from_body(body: BodyStream, method: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(pump(body, method.into(), tx));
        Self { receiver: rx, task }
    }
}

impl<T> SseStream<T> {
    /// Get the next result from the stream.
    ///
    /// Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<A2AResult<T>> {
        self.receiver.recv().await
    }
}

impl<T> Stream for SseStream<T> {
    type Item = A2AResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for SseStream<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Read `body` to completion, forwarding results to `tx`.
///
/// `body` is owned here, so every return (and cancellation via abort)
/// releases it.
async fn pump<T: DeserializeOwned>(
    mut body: BodyStream,
    method: String,
    tx: mpsc::Sender<A2AResult<T>>,
) {
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::error!("error reading SSE stream for method {}: {}", method, e);
                let _ = tx
                    .send(Err(A2AError::Transport(format!(
                        "error reading SSE stream: {e}"
                    ))))
                    .await;
                return;
            }
        };

        for message in decoder.push(&chunk) {
            match interpret::<T>(&message, &method) {
                Outcome::Yield(value) => {
                    if tx.send(Ok(value)).await.is_err() {
                        tracing::debug!("SSE consumer for method {} went away", method);
                        return;
                    }
                }
                Outcome::Skip => {}
                Outcome::Abort(error) => {
                    let _ = tx.send(Err(A2AError::Rpc(error))).await;
                    return;
                }
            }
        }
    }

    if let Some(rest) = decoder.finish() {
        tracing::warn!(
            "SSE stream ended with partial data in buffer for method {}: {}",
            method,
            rest
        );
    }
    tracing::debug!("SSE stream finished for method {}", method);
}
