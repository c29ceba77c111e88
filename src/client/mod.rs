//! A2A client: discover agents and call them.
//!
//! - [`A2AClient`]: typed methods for every task lifecycle call
//! - [`JsonRpcClient`]: the JSON-RPC engine underneath, with 401
//!   re-authentication through an [`AuthenticationHandler`]
//! - [`AgentResolver`] / [`resolve_agent`]: resolve a `did:web` DID or URL to
//!   an endpoint and agent card
//! - [`SseStream`]: streamed results of `tasks/sendSubscribe` and
//!   `tasks/resubscribe`
//! - [`HttpFetch`]: the injectable network function, [`ReqwestFetch`] by default
//!
//! # Quick Start
//!
//! ```no_run
//! use agentic_a2a::client::{resolve_agent, A2AClient};
//! use agentic_a2a::types::{Message, TaskSendParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = resolve_agent("did:web:localhost%3A3003#a2a-coder").await?;
//! let client = A2AClient::from_context(&context);
//!
//! // Send a text message:
//! if let Some(task) = client.send_text("Hello, agent!").await? {
//!     println!("Task {}: {}", task.id, task.status.state);
//! }
//!
//! // Stream updates:
//! let params = TaskSendParams::new("task-42", Message::user_text("Write a haiku"));
//! let mut stream = client.send_task_subscribe(params).await?;
//! while let Some(event) = stream.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod auth;
mod discovery;
mod json_rpc;
mod sse;
mod transport;

pub use a2a_client::A2AClient;
pub use auth::{AuthenticationHandler, StaticHeaderAuth};
pub use discovery::{
    agent_card_url, did_web_to_url, resolve_agent, AgentContext, AgentReference, AgentResolver,
    HttpJsonFetcher, JsonDocumentFetcher,
};
pub use json_rpc::{AcceptMode, JsonRpcClient};
pub use sse::{SseDecoder, SseEvent, SseStream};
pub use transport::{
    BodyStream, FetchConfig, FetchError, HttpFetch, HttpMethod, HttpRequest, HttpResponse,
    ReqwestFetch,
};
