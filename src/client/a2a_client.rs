//! High-level A2A client for interacting with remote agents.
//!
//! Typed methods for every method of the task lifecycle, on top of
//! [`JsonRpcClient`].

use std::sync::Arc;

use crate::builders::ClientBuilder;
use crate::error::A2AResult;
use crate::types::{
    methods, AgentCard, Capability, Message, Task, TaskIdParams, TaskPushNotificationConfig,
    TaskQueryParams, TaskSendParams, TaskStreamEvent,
};

use super::discovery::AgentContext;
use super::json_rpc::JsonRpcClient;
use super::sse::SseStream;
use super::transport::ReqwestFetch;

/// Client for interacting with A2A-compatible agents.
///
/// Provides typed methods for the A2A JSON-RPC methods:
/// - `tasks/send`: send a message, get the task back
/// - `tasks/sendSubscribe`: send a message and stream status/artifact updates
/// - `tasks/get`: retrieve a task by id
/// - `tasks/cancel`: cancel a running task
/// - `tasks/pushNotification/set` / `get`: manage push notification config
/// - `tasks/resubscribe`: reconnect to a task's update stream
///
/// Non-streaming methods return `Ok(None)` when the agent answered without a
/// payload (an absent or `null` result).
///
/// # Construction
///
/// ```no_run
/// use agentic_a2a::client::{resolve_agent, A2AClient};
///
/// # async fn example() -> agentic_a2a::A2AResult<()> {
/// // From a known endpoint:
/// let client = A2AClient::new("http://localhost:3003/users/2/coder/");
///
/// // From a DID or URL, via discovery:
/// let context = resolve_agent("did:web:localhost%3A3003#a2a-coder").await?;
/// let client = A2AClient::from_context(&context);
///
/// // With authentication or custom HTTP settings:
/// let client = A2AClient::builder("http://localhost:3003/users/2/coder/")
///     .with_bearer_token("secret")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct A2AClient {
    rpc: JsonRpcClient,
    agent_card: Option<AgentCard>,
}

impl A2AClient {
    /// Create a client for `base_url` with a default HTTP fetcher and no
    /// authentication.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_rpc_client(JsonRpcClient::new(base_url, Arc::new(ReqwestFetch::new())))
    }

    /// Create a client over a configured [`JsonRpcClient`].
    pub fn with_rpc_client(rpc: JsonRpcClient) -> Self {
        Self {
            rpc,
            agent_card: None,
        }
    }

    /// Create a client for a resolved agent, keeping its card.
    ///
    /// Uses a default HTTP fetcher; go through [`A2AClient::builder`] and
    /// [`ClientBuilder::resolve`] to configure it.
    pub fn from_context(context: &AgentContext) -> Self {
        Self::with_rpc_client(JsonRpcClient::new(
            context.endpoint(),
            Arc::new(ReqwestFetch::new()),
        ))
        .with_agent_card(context.agent_card.clone())
    }

    /// Start configuring a client for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Attach an agent card (builder-style).
    pub fn with_agent_card(mut self, card: AgentCard) -> Self {
        self.agent_card = Some(card);
        self
    }

    /// The endpoint requests are posted to (without trailing `/`).
    pub fn base_url(&self) -> &str {
        self.rpc.base_url()
    }

    /// The agent card, if the client was created from a resolved agent.
    pub fn agent_card(&self) -> Option<&AgentCard> {
        self.agent_card.as_ref()
    }

    /// Whether the known agent card declares `capability`.
    ///
    /// `false` when no card is known.
    pub fn supports(&self, capability: Capability) -> bool {
        self.agent_card
            .as_ref()
            .is_some_and(|card| card.supports(capability))
    }

    /// The underlying JSON-RPC client.
    pub fn rpc_client(&self) -> &JsonRpcClient {
        &self.rpc
    }

    // ──────────────────────────────────────────────────
    // Task methods
    // ──────────────────────────────────────────────────

    /// Send a task message (`tasks/send`).
    pub async fn send_task(&self, params: TaskSendParams) -> A2AResult<Option<Task>> {
        self.call(methods::SEND_TASK, &params).await
    }

    /// Send a task message and stream its updates (`tasks/sendSubscribe`).
    ///
    /// Yields status and artifact update events until the agent closes the
    /// stream.
    pub async fn send_task_subscribe(
        &self,
        params: TaskSendParams,
    ) -> A2AResult<SseStream<TaskStreamEvent>> {
        self.rpc
            .subscribe(methods::SEND_TASK_SUBSCRIBE, &params)
            .await
    }

    /// Get the current state of a task (`tasks/get`).
    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Option<Task>> {
        self.call(methods::GET_TASK, &params).await
    }

    /// Cancel a running task (`tasks/cancel`).
    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Option<Task>> {
        self.call(methods::CANCEL_TASK, &params).await
    }

    /// Set push notification configuration for a task
    /// (`tasks/pushNotification/set`).
    pub async fn set_task_push_notification(
        &self,
        params: TaskPushNotificationConfig,
    ) -> A2AResult<Option<TaskPushNotificationConfig>> {
        self.call(methods::SET_TASK_PUSH_NOTIFICATION, &params)
            .await
    }

    /// Get push notification configuration for a task
    /// (`tasks/pushNotification/get`).
    pub async fn get_task_push_notification(
        &self,
        params: TaskIdParams,
    ) -> A2AResult<Option<TaskPushNotificationConfig>> {
        self.call(methods::GET_TASK_PUSH_NOTIFICATION, &params)
            .await
    }

    /// Reconnect to a task's update stream (`tasks/resubscribe`).
    ///
    /// Starts from whatever the agent sends next; no position from an
    /// earlier stream is carried over.
    pub async fn resubscribe_task(
        &self,
        params: TaskQueryParams,
    ) -> A2AResult<SseStream<TaskStreamEvent>> {
        self.rpc.subscribe(methods::RESUBSCRIBE_TASK, &params).await
    }

    // ──────────────────────────────────────────────────
    // Convenience helpers
    // ──────────────────────────────────────────────────

    /// Send a single text message as a new task.
    ///
    /// The task id is a fresh UUID v4.
    pub async fn send_text(&self, text: &str) -> A2AResult<Option<Task>> {
        let params = TaskSendParams::new(uuid::Uuid::new_v4().to_string(), Message::user_text(text));
        self.send_task(params).await
    }

    /// JSON call whose `null` result counts as no payload.
    async fn call<P, T>(&self, method: &str, params: &P) -> A2AResult<Option<T>>
    where
        P: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        self.rpc
            .call::<P, Option<T>>(method, params)
            .await
            .map(Option::flatten)
    }
}
