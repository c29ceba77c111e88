//! Caller-supplied authentication for JSON-RPC calls.
//!
//! The client asks an [`AuthenticationHandler`] for headers on every attempt.
//! When an agent answers `401 Unauthorized`, the handler gets one chance to
//! answer the challenge; if it asks for a retry, the request is sent exactly
//! once more and [`AuthenticationHandler::on_success`] runs if that succeeds.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::A2AResult;

use super::transport::HttpResponse;

/// Authentication strategy for a client.
///
/// All three operations have no-op defaults, so an implementation only
/// overrides what it needs. The handler is shared by every request of a
/// client and may be called concurrently; any state it keeps must be
/// synchronized by the implementation.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::RwLock;
///
/// use agentic_a2a::client::{AuthenticationHandler, HttpResponse};
/// use agentic_a2a::A2AResult;
/// use async_trait::async_trait;
///
/// struct SessionToken {
///     token: RwLock<Option<String>>,
/// }
///
/// #[async_trait]
/// impl AuthenticationHandler for SessionToken {
///     fn headers(&self) -> HashMap<String, String> {
///         let mut headers = HashMap::new();
///         if let Some(token) = self.token.read().unwrap().as_ref() {
///             headers.insert("Authorization".to_string(), format!("Agentic {token}"));
///         }
///         headers
///     }
///
///     async fn process_401(&self, response: &mut HttpResponse) -> A2AResult<bool> {
///         // Answer the challenge carried in the 401 body, then retry.
///         let challenge = response.text().await.unwrap_or_default();
///         *self.token.write().unwrap() = Some(format!("signed({challenge})"));
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Headers to add to the next request attempt.
    ///
    /// Called once per attempt, so a credential obtained in
    /// [`process_401`](Self::process_401) is picked up by the retry.
    fn headers(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Handle a `401` response. Return `true` to retry the request once.
    ///
    /// The handler may read the response body (e.g. to extract a challenge).
    /// When it returns `false`, the response is handed back to the caller as
    /// it was left. Errors propagate to the caller unchanged.
    async fn process_401(&self, _response: &mut HttpResponse) -> A2AResult<bool> {
        Ok(false)
    }

    /// Called after a retried request came back with a 2xx status, so the
    /// handler can remember the credential that worked.
    async fn on_success(&self) -> A2AResult<()> {
        Ok(())
    }
}

/// Adds a fixed set of headers to every request and never retries.
///
/// # Example
///
/// ```
/// use agentic_a2a::client::{AuthenticationHandler, StaticHeaderAuth};
///
/// let auth = StaticHeaderAuth::bearer("secret");
/// assert_eq!(auth.headers()["Authorization"], "Bearer secret");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticHeaderAuth {
    headers: HashMap<String, String>,
}

impl StaticHeaderAuth {
    /// A handler with no headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler sending `Authorization: Bearer <token>`.
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self::new().with_header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Add a header (builder-style).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl AuthenticationHandler for StaticHeaderAuth {
    fn headers(&self) -> HashMap<String, String> {
        self.headers.clone()
    }
}
