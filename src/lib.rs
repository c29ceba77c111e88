//! # agentic-a2a: Agent-to-Agent (A2A) client with DID-based discovery
//!
//! Calls remote A2A agents over JSON-RPC 2.0, with task updates streamed via
//! Server-Sent Events (SSE). Agents are addressed by HTTP(S) URL or by a
//! `did:web` DID whose document lists the agent as an `A2A` service.
//!
//! ## Overview
//!
//! - **Discovery** ([`client::resolve_agent`]): DID or URL to endpoint plus
//!   [`AgentCard`]
//! - **Transport** ([`client::JsonRpcClient`]): envelopes, response
//!   validation, and one re-authenticated retry on `401 Unauthorized`
//! - **Facade** ([`client::A2AClient`]): `tasks/send`, `tasks/sendSubscribe`,
//!   `tasks/get`, `tasks/cancel`, `tasks/pushNotification/set`,
//!   `tasks/pushNotification/get`, `tasks/resubscribe`
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | The client, with the reqwest-backed HTTP fetcher |
//!
//! ## Quick Start
//!
//! ```no_run
//! use agentic_a2a::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Resolve the agent, then talk to its endpoint
//!     let client = ClientBuilder::new("did:web:localhost%3A3003#a2a-coder")
//!         .resolve()
//!         .await?;
//!
//!     // Send a task and wait for the reply
//!     if let Some(task) = client.send_text("Write a haiku about Rust").await? {
//!         println!("Task: {} (status: {})", task.id, task.status.state);
//!     }
//!
//!     // Or stream updates as they happen
//!     let params = TaskSendParams::new("story-1", Message::user_text("Tell me a story"));
//!     let mut stream = client.send_task_subscribe(params).await?;
//!     while let Some(event) = stream.next().await {
//!         match event? {
//!             TaskStreamEvent::StatusUpdate(update) => {
//!                 println!("Status: {}", update.status.state);
//!             }
//!             TaskStreamEvent::ArtifactUpdate(update) => {
//!                 println!("Artifact: {:?}", update.artifact.name);
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Implement [`client::AuthenticationHandler`] to add credentials and to
//! answer `401` challenges; the request is retried once if the handler asks
//! for it. [`client::StaticHeaderAuth`] covers fixed headers.
//!
//! ## Errors
//!
//! Everything returns [`A2AResult`]. JSON-RPC failures, local or remote, are
//! [`A2AError::Rpc`] carrying the code, message and data; see [`error`] for
//! the other variants.

pub mod builders;
pub mod error;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

/// Prelude module that re-exports commonly used types and traits.
///
/// # Example
///
/// ```
/// use agentic_a2a::prelude::*;
///
/// let message = Message::user_text("hello");
/// assert_eq!(message.role, Role::User);
/// ```
pub mod prelude {
    // Core types
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentSkill, Artifact, Capability, FileContent, Message,
        Part, Role, Task, TaskArtifactUpdateEvent, TaskIdParams, TaskPushNotificationConfig,
        TaskQueryParams, TaskSendParams, TaskState, TaskStatus, TaskStatusUpdateEvent,
        TaskStreamEvent,
    };

    // Error types
    pub use crate::error::{A2AError, A2AResult, RpcError};

    // Builders
    pub use crate::builders::AgentCardBuilder;

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::{
        resolve_agent, A2AClient, AgentContext, AuthenticationHandler, SseStream,
    };
}

// Re-export core types at crate root for convenience.
pub use builders::AgentCardBuilder;
pub use error::{A2AError, A2AResult, RpcError};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;
