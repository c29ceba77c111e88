//! A2A protocol types for the task-based JSON-RPC binding.
//!
//! Covers the payloads moved by the client (tasks, messages, parts,
//! artifacts, streaming events, push-notification configs), the agent card,
//! the DID document consumed by discovery, and the JSON-RPC 2.0 envelopes.
//! All types serialize with `camelCase` field names to match the wire format.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::RpcError;

// ============================================================================
// Method names
// ============================================================================

/// JSON-RPC method names for the task lifecycle.
pub mod methods {
    /// Send a task (single JSON response).
    pub const SEND_TASK: &str = "tasks/send";
    /// Send a task and subscribe to its updates (SSE).
    pub const SEND_TASK_SUBSCRIBE: &str = "tasks/sendSubscribe";
    /// Get a task.
    pub const GET_TASK: &str = "tasks/get";
    /// Cancel a task.
    pub const CANCEL_TASK: &str = "tasks/cancel";
    /// Set the push notification config of a task.
    pub const SET_TASK_PUSH_NOTIFICATION: &str = "tasks/pushNotification/set";
    /// Get the push notification config of a task.
    pub const GET_TASK_PUSH_NOTIFICATION: &str = "tasks/pushNotification/get";
    /// Resubscribe to a task's updates (SSE).
    pub const RESUBSCRIBE_TASK: &str = "tasks/resubscribe";
}

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Enums
// ============================================================================

/// The lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    /// Task has been received but not yet started.
    Submitted,
    /// Task is actively being processed.
    Working,
    /// Task requires additional input from the user.
    InputRequired,
    /// Task completed successfully.
    Completed,
    /// Task was canceled.
    Canceled,
    /// Task failed.
    Failed,
    /// Unknown state.
    #[serde(other)]
    Unknown,
}

impl TaskState {
    /// Returns `true` for states a task never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input-required",
            TaskState::Completed => "completed",
            TaskState::Canceled => "canceled",
            TaskState::Failed => "failed",
            TaskState::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from the user / client.
    User,
    /// Message from the agent / server.
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

// ============================================================================
// Core Task Types
// ============================================================================

/// Current status of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// The current state.
    pub state: TaskState,

    /// Optional message associated with this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// ISO-8601 timestamp of when this status was set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A task, the unit of work an agent performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: String,

    /// Session the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Current task status.
    pub status: TaskStatus,

    /// Artifacts produced by the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<Artifact>>,

    /// Message history for this task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Task {
    /// Returns `true` if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.state.is_terminal()
    }
}

// ============================================================================
// Message & Parts
// ============================================================================

/// A single message exchanged between user and agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Who sent this message.
    pub role: Role,

    /// Content parts of the message.
    pub parts: Vec<Part>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Message {
    /// A user message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// An agent message with a single text part.
    pub fn agent_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// Concatenate the text of every text part, separated by `sep`.
    pub fn text(&self, sep: &str) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// File content: inline base64 bytes and/or a URI reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Optional file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// MIME type of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded file content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,

    /// URI pointing to the file content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A content part within a message or artifact.
///
/// JSON wire format:
/// - Text: `{"type": "text", "text": "hello"}`
/// - File: `{"type": "file", "file": {"name": "main.rs", "bytes": "Zm4gbWFpbigpIHt9"}}`
/// - Data: `{"type": "data", "data": {"key": "value"}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Part {
    /// A text content part.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
        /// Optional metadata associated with this part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A file content part.
    #[serde(rename = "file")]
    File {
        /// The file content.
        file: FileContent,
        /// Optional metadata associated with this part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    /// A structured data content part.
    #[serde(rename = "data")]
    Data {
        /// Arbitrary structured data.
        data: serde_json::Value,
        /// Optional metadata associated with this part.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
}

impl Part {
    /// A text part without metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// The text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// An artifact produced by a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content parts of the artifact.
    pub parts: Vec<Part>,

    /// Position of this artifact in the task's artifact list.
    #[serde(default)]
    pub index: u32,

    /// Whether to append to an existing artifact at the same index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub append: Option<bool>,

    /// Whether this is the last chunk of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chunk: Option<bool>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

// ============================================================================
// Streaming Events
// ============================================================================

/// Notification that a task's status has changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdateEvent {
    /// ID of the task whose status changed.
    pub id: String,

    /// The new status.
    pub status: TaskStatus,

    /// Whether this is the last event the agent will send for this task.
    #[serde(rename = "final", default)]
    pub r#final: bool,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Notification that an artifact has been created or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskArtifactUpdateEvent {
    /// ID of the task that produced the artifact.
    pub id: String,

    /// The artifact.
    pub artifact: Artifact,

    /// Whether this is the last event the agent will send for this task.
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub r#final: Option<bool>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A streamed task update: the `result` of each SSE message on
/// `tasks/sendSubscribe` and `tasks/resubscribe`.
///
/// The wire format carries no discriminator; a payload with a `status`
/// member is a status update and one with an `artifact` member is an
/// artifact update. Serializes flat.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStreamEvent {
    /// A task status update event.
    StatusUpdate(TaskStatusUpdateEvent),

    /// An artifact update event.
    ArtifactUpdate(TaskArtifactUpdateEvent),
}

impl TaskStreamEvent {
    /// ID of the task this event belongs to.
    pub fn task_id(&self) -> &str {
        match self {
            TaskStreamEvent::StatusUpdate(event) => &event.id,
            TaskStreamEvent::ArtifactUpdate(event) => &event.id,
        }
    }

    /// Whether the agent marked this as the last event of the stream.
    pub fn is_final(&self) -> bool {
        match self {
            TaskStreamEvent::StatusUpdate(event) => event.r#final,
            TaskStreamEvent::ArtifactUpdate(event) => event.r#final.unwrap_or(false),
        }
    }
}

impl Serialize for TaskStreamEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaskStreamEvent::StatusUpdate(inner) => inner.serialize(serializer),
            TaskStreamEvent::ArtifactUpdate(inner) => inner.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStreamEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("status").is_some() {
            let event: TaskStatusUpdateEvent =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            Ok(TaskStreamEvent::StatusUpdate(event))
        } else if value.get("artifact").is_some() {
            let event: TaskArtifactUpdateEvent =
                serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            Ok(TaskStreamEvent::ArtifactUpdate(event))
        } else {
            Err(serde::de::Error::custom(
                "task stream event has neither 'status' nor 'artifact'",
            ))
        }
    }
}

// ============================================================================
// Agent Card & Related Types
// ============================================================================

/// Self-describing manifest for an A2A agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Human-readable name.
    pub name: String,

    /// Description of the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Endpoint URL of the agent, when the card declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Service provider information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    /// Agent version string.
    pub version: String,

    /// URL to the agent's documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Agent capabilities.
    #[serde(default)]
    pub capabilities: AgentCapabilities,

    /// Authentication requirements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AgentAuthentication>,

    /// Default MIME types / modes accepted as input.
    #[serde(default = "default_modes")]
    pub default_input_modes: Vec<String>,

    /// Default MIME types / modes produced as output.
    #[serde(default = "default_modes")]
    pub default_output_modes: Vec<String>,

    /// Skills the agent supports.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

fn default_modes() -> Vec<String> {
    vec!["text".to_string()]
}

/// An optional capability an agent card can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `tasks/sendSubscribe` and `tasks/resubscribe` are available.
    Streaming,
    /// `tasks/pushNotification/*` are available.
    PushNotifications,
}

impl AgentCard {
    /// Whether the card declares the given capability.
    ///
    /// A missing flag counts as unsupported. This is a client-side heuristic;
    /// the agent may still reject the call.
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Streaming => self.capabilities.streaming.unwrap_or(false),
            Capability::PushNotifications => {
                self.capabilities.push_notifications.unwrap_or(false)
            }
        }
    }
}

/// Agent capabilities declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether the agent supports streaming responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,

    /// Whether the agent supports push notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,

    /// Whether the agent keeps a history of state transitions for a task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_transition_history: Option<bool>,
}

/// Authentication schemes an agent accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAuthentication {
    /// Scheme names (e.g. `"Bearer"`).
    pub schemes: Vec<String>,

    /// Optional credentials hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

/// A skill that an agent can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Unique skill identifier.
    pub id: String,

    /// Human-readable skill name.
    pub name: String,

    /// Description of what the skill does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Categorization tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Example prompts/inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,

    /// Modes this skill accepts as input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_modes: Option<Vec<String>>,

    /// Modes this skill produces as output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_modes: Option<Vec<String>>,
}

/// Information about the agent's provider/organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentProvider {
    /// Organization name.
    pub organization: String,

    /// Organization URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ============================================================================
// DID Document (agentic profile)
// ============================================================================

/// A DID document as served for `did:web` identities.
///
/// Only the members discovery needs are typed; everything else is kept in
/// `extra`. Signatures and verification methods are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// The DID this document describes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Raw service entries; A2A agents are listed here. Entries are only
    /// typed once selected (see [`DidDocument::find_service`]), so services
    /// of other protocols may use any shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<serde_json::Value>>,

    /// Remaining members (`@context`, `verificationMethod`, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DidDocument {
    /// The first service entry whose `id` is one of `ids`, parsed.
    ///
    /// Returns `None` when no entry matches; ids compare case-sensitively.
    pub fn find_service(&self, ids: &[&str]) -> Option<Result<DidService, serde_json::Error>> {
        self.service
            .iter()
            .flatten()
            .find(|entry| {
                entry
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .is_some_and(|id| ids.contains(&id))
            })
            .map(|entry| serde_json::from_value(entry.clone()))
    }
}

/// One entry of a DID document's `service` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidService {
    /// Service id, usually a fragment such as `#a2a-coder`.
    pub id: String,

    /// Declared service type (`A2A` for agents).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,

    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A URL string, a list of URLs, or a map (maps are not usable here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<serde_json::Value>,

    /// Remaining members (`capabilityInvocation`, ...).
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl DidService {
    /// Returns `true` if the service declares `service_type`, ignoring ASCII
    /// case.
    pub fn has_type(&self, service_type: &str) -> bool {
        match &self.service_type {
            Some(ServiceType::One(ty)) => ty.eq_ignore_ascii_case(service_type),
            Some(ServiceType::Many(types)) => {
                types.iter().any(|ty| ty.eq_ignore_ascii_case(service_type))
            }
            None => false,
        }
    }

    /// The endpoint URL: the string itself, or the first element of a list.
    pub fn endpoint_url(&self) -> Option<&str> {
        let url = match self.service_endpoint.as_ref()? {
            serde_json::Value::String(url) => Some(url.as_str()),
            serde_json::Value::Array(urls) => urls.first()?.as_str(),
            _ => None,
        };
        url.filter(|url| !url.is_empty())
    }
}

/// A service `type`: one name or a set of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceType {
    /// A single type name.
    One(String),
    /// Several type names.
    Many(Vec<String>),
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::One(ty) => write!(f, "{}", ty),
            ServiceType::Many(types) => write!(f, "{}", types.join(", ")),
        }
    }
}

// ============================================================================
// Push Notifications
// ============================================================================

/// Configuration for push notification delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotificationConfig {
    /// URL to deliver notifications to.
    pub url: String,

    /// Optional verification token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Authentication configuration for the push endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AgentAuthentication>,
}

/// Push notification config bound to a specific task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPushNotificationConfig {
    /// Task this config applies to.
    pub id: String,

    /// The push notification configuration details.
    pub push_notification_config: PushNotificationConfig,
}

// ============================================================================
// Request Parameter Types
// ============================================================================

/// Parameters for `tasks/send` and `tasks/sendSubscribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSendParams {
    /// Task id, chosen by the client.
    pub id: String,

    /// Session to group related tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// The message to send.
    pub message: Message,

    /// Output modes the client accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_output_modes: Option<Vec<String>>,

    /// Where to push updates for this task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notification: Option<PushNotificationConfig>,

    /// Number of history messages to include in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskSendParams {
    /// Parameters carrying only a task id and a message.
    pub fn new(id: impl Into<String>, message: Message) -> Self {
        Self {
            id: id.into(),
            session_id: None,
            message,
            accepted_output_modes: None,
            push_notification: None,
            history_length: None,
            metadata: None,
        }
    }

    /// Set the session id (builder-style).
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Parameters for `tasks/get` and `tasks/resubscribe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    /// Task id.
    pub id: String,

    /// Number of history messages to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<u32>,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskQueryParams {
    /// Query a task by id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history_length: None,
            metadata: None,
        }
    }
}

/// Parameters for `tasks/cancel` and `tasks/pushNotification/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdParams {
    /// Task id.
    pub id: String,

    /// Arbitrary metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TaskIdParams {
    /// Address a task by id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            metadata: None,
        }
    }
}

// ============================================================================
// JSON-RPC Foundation
// ============================================================================

/// A JSON-RPC 2.0 request id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    /// String identifier.
    String(String),
    /// Numeric identifier.
    Number(i64),
    /// Null.
    Null,
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "{}", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
            JsonRpcId::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier.
    pub id: JsonRpcId,

    /// Method name.
    pub method: String,

    /// Method parameters, passed through unvalidated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Build a request with a fresh UUID v4 id.
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: JsonRpcId::String(uuid::Uuid::new_v4().to_string()),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// `result` distinguishes an absent member (`None`) from an explicit `null`
/// (`Some(Value::Null)`). The `id` is kept as raw JSON since responses are
/// never matched against it. Any non-null `error` member becomes an
/// [`RpcError`], however incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0".
    pub jsonrpc: String,

    /// Request identifier this response corresponds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// Successful result.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<serde_json::Value>,

    /// Error result.
    #[serde(
        default,
        deserialize_with = "deserialize_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<RpcError>,
}

/// Maps a present member to `Some` even when its value is `null`; an absent
/// member falls back to `#[serde(default)]`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<RpcError>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        value => Some(RpcError::from_wire(value)),
    })
}

impl JsonRpcResponse {
    /// Create a successful JSON-RPC response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error JSON-RPC response.
    pub fn error(id: Option<serde_json::Value>, error: RpcError) -> Self {
        JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_state_round_trips_kebab_case() {
        assert_eq!(
            serde_json::to_value(TaskState::InputRequired).unwrap(),
            json!("input-required")
        );
        let state: TaskState = serde_json::from_value(json!("canceled")).unwrap();
        assert_eq!(state, TaskState::Canceled);
        assert!(state.is_terminal());
    }

    #[test]
    fn unrecognized_task_state_is_unknown() {
        let state: TaskState = serde_json::from_value(json!("paused")).unwrap();
        assert_eq!(state, TaskState::Unknown);
    }

    #[test]
    fn part_is_tagged_by_type() {
        let json = serde_json::to_value(Part::text("hi")).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "hi"}));

        let part: Part = serde_json::from_value(json!({
            "type": "file",
            "file": {"name": "main.rs", "mimeType": "text/x-rust", "bytes": "Zm4="}
        }))
        .unwrap();
        match part {
            Part::File { file, .. } => {
                assert_eq!(file.name.as_deref(), Some("main.rs"));
                assert_eq!(file.mime_type.as_deref(), Some("text/x-rust"));
                assert!(file.uri.is_none());
            }
            other => panic!("expected file part, got {other:?}"),
        }
    }

    #[test]
    fn message_text_joins_text_parts() {
        let message = Message {
            role: Role::Agent,
            parts: vec![
                Part::text("one"),
                Part::Data {
                    data: json!({"skip": true}),
                    metadata: None,
                },
                Part::text("two"),
            ],
            metadata: None,
        };
        assert_eq!(message.text(" "), "one two");
    }

    #[test]
    fn stream_event_discriminates_on_members() {
        let status: TaskStreamEvent = serde_json::from_value(json!({
            "id": "t1",
            "status": {"state": "working"},
            "final": false
        }))
        .unwrap();
        assert!(matches!(status, TaskStreamEvent::StatusUpdate(_)));
        assert!(!status.is_final());

        let artifact: TaskStreamEvent = serde_json::from_value(json!({
            "id": "t1",
            "artifact": {"name": "out.txt", "parts": [{"type": "text", "text": "x"}], "index": 0},
            "final": true
        }))
        .unwrap();
        assert_eq!(artifact.task_id(), "t1");
        assert!(artifact.is_final());

        let neither = serde_json::from_value::<TaskStreamEvent>(json!({"id": "t1"}));
        assert!(neither.is_err());
    }

    #[test]
    fn stream_event_serializes_flat() {
        let event = TaskStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
            id: "t1".into(),
            status: TaskStatus {
                state: TaskState::Completed,
                message: None,
                timestamp: None,
            },
            r#final: true,
            metadata: None,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["final"], true);
        assert_eq!(json["status"]["state"], "completed");
    }

    #[test]
    fn agent_card_tolerates_sparse_documents() {
        let card: AgentCard = serde_json::from_value(json!({
            "name": "Coder Agent",
            "url": null,
            "provider": {"organization": "A2A Samples"},
            "version": "0.0.1",
            "capabilities": {"streaming": true, "pushNotifications": false},
            "authentication": null,
            "skills": [{"id": "code_generation", "name": "Code Generation"}]
        }))
        .unwrap();
        assert!(card.url.is_none());
        assert_eq!(card.default_input_modes, vec!["text".to_string()]);
        assert!(card.supports(Capability::Streaming));
        assert!(!card.supports(Capability::PushNotifications));
    }

    #[test]
    fn missing_capability_flag_is_unsupported() {
        let card: AgentCard =
            serde_json::from_value(json!({"name": "n", "version": "1"})).unwrap();
        assert!(!card.supports(Capability::Streaming));
        assert!(!card.supports(Capability::PushNotifications));
    }

    #[test]
    fn did_service_endpoint_forms() {
        let service: DidService = serde_json::from_value(json!({
            "id": "#a2a-coder",
            "type": "A2A",
            "serviceEndpoint": ["http://localhost:3003/users/2/coder/", "http://backup/"]
        }))
        .unwrap();
        assert_eq!(
            service.endpoint_url(),
            Some("http://localhost:3003/users/2/coder/")
        );

        let map_endpoint: DidService = serde_json::from_value(json!({
            "id": "#a2a",
            "serviceEndpoint": {"uri": "http://x"}
        }))
        .unwrap();
        assert_eq!(map_endpoint.endpoint_url(), None);

        let empty: DidService =
            serde_json::from_value(json!({"id": "#a2a", "serviceEndpoint": ""})).unwrap();
        assert_eq!(empty.endpoint_url(), None);
    }

    #[test]
    fn service_type_may_be_a_list() {
        let service: DidService = serde_json::from_value(json!({
            "id": "#a2a-coder",
            "type": ["LinkedDomains", "a2a"],
            "serviceEndpoint": "http://x/"
        }))
        .unwrap();
        assert!(service.has_type("A2A"));
        assert!(!service.has_type("MCP"));
        assert_eq!(service.service_type.unwrap().to_string(), "LinkedDomains, a2a");
    }

    #[test]
    fn find_service_ignores_unrelated_entries() {
        let document: DidDocument = serde_json::from_value(json!({
            "id": "did:web:example.com",
            "service": [
                {"type": ["LinkedDomains"], "serviceEndpoint": {"origins": ["https://example.com"]}},
                {"id": "#site", "type": {"weird": true}},
                {"id": "#a2a-coder", "type": "A2A", "serviceEndpoint": "http://x/"}
            ]
        }))
        .unwrap();

        let service = document.find_service(&["#a2a-coder"]).unwrap().unwrap();
        assert_eq!(service.endpoint_url(), Some("http://x/"));
        assert!(document.find_service(&["#A2A-CODER"]).is_none());
        assert!(document.find_service(&["#site"]).unwrap().is_err());
    }

    #[test]
    fn request_carries_version_and_uuid_id() {
        let request = JsonRpcRequest::new(methods::GET_TASK, Some(json!({"id": "t1"})));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "tasks/get");
        let id = json["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn response_distinguishes_absent_and_null_result() {
        let absent: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert_eq!(absent.result, None);

        let null: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(null.result, Some(serde_json::Value::Null));

        let value: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "a", "result": {"x": 1}}))
                .unwrap();
        assert_eq!(value.result, Some(json!({"x": 1})));
        assert_eq!(value.id, Some(json!("a")));
    }

    #[test]
    fn response_accepts_any_id_shape() {
        for id in [json!(1.5), json!(u64::MAX), json!({"n": 1}), json!(null)] {
            let response: JsonRpcResponse =
                serde_json::from_value(json!({"jsonrpc": "2.0", "id": id, "result": {"x": 1}}))
                    .unwrap();
            assert_eq!(response.result, Some(json!({"x": 1})));
        }
    }

    #[test]
    fn response_error_member_is_never_rejected() {
        let partial: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000}}))
                .unwrap();
        let error = partial.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.data, Some(json!({"code": -32000})));

        let null: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "error": null, "result": 2}))
                .unwrap();
        assert!(null.error.is_none());
    }

    #[test]
    fn task_send_params_serialize_camel_case() {
        let params = TaskSendParams::new("t1", Message::user_text("hello")).with_session_id("s1");
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["message"]["role"], "user");
        assert_eq!(json["message"]["parts"][0]["text"], "hello");
        assert!(json.get("historyLength").is_none());
    }
}
