//! Builder patterns for ergonomic construction of A2A types.

use crate::types::*;

#[cfg(feature = "client")]
use std::collections::HashMap;
#[cfg(feature = "client")]
use std::sync::Arc;
#[cfg(feature = "client")]
use std::time::Duration;

#[cfg(feature = "client")]
use async_trait::async_trait;

#[cfg(feature = "client")]
use crate::client::{
    A2AClient, AgentResolver, AuthenticationHandler, FetchConfig, FetchError, HttpFetch,
    HttpRequest, HttpResponse, JsonRpcClient, ReqwestFetch,
};
#[cfg(feature = "client")]
use crate::error::{A2AError, A2AResult};

/// Builder for constructing [`AgentCard`] with sensible defaults.
///
/// On the client side a card is normally discovered, but some agents are
/// reached by a bare endpoint that publishes none. Building the card locally
/// and attaching it with `A2AClient::with_agent_card` lets capability checks
/// such as `A2AClient::supports` work the same way. It is also how stub
/// agents describe themselves in tests.
///
/// # Example
///
/// ```
/// use agentic_a2a::builders::AgentCardBuilder;
///
/// let card = AgentCardBuilder::new("Coder", "1.0.0")
///     .with_description("Writes code on request")
///     .with_url("http://localhost:3003/users/2/coder/")
///     .with_skill("code", "Code", "Code generation", vec!["coding".to_string()])
///     .with_streaming(true)
///     .build();
/// assert_eq!(card.default_input_modes, vec!["text".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct AgentCardBuilder {
    name: String,
    version: String,
    description: Option<String>,
    url: Option<String>,
    provider: Option<AgentProvider>,
    documentation_url: Option<String>,
    capabilities: AgentCapabilities,
    authentication: Option<AgentAuthentication>,
    default_input_modes: Vec<String>,
    default_output_modes: Vec<String>,
    skills: Vec<AgentSkill>,
}

impl AgentCardBuilder {
    /// Create a new builder with the required fields.
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable agent name
    /// * `version` - Version string (e.g., "1.0.0")
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            url: None,
            provider: None,
            documentation_url: None,
            capabilities: AgentCapabilities::default(),
            authentication: None,
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            skills: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the agent endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the provider organization.
    pub fn with_provider(mut self, organization: impl Into<String>, url: Option<String>) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url,
        });
        self
    }

    /// Set the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Declare streaming support.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = Some(enabled);
        self
    }

    /// Declare push notification support.
    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.push_notifications = Some(enabled);
        self
    }

    /// Declare state transition history support.
    pub fn with_state_transition_history(mut self, enabled: bool) -> Self {
        self.capabilities.state_transition_history = Some(enabled);
        self
    }

    /// Declare the accepted authentication schemes.
    pub fn with_authentication(mut self, schemes: Vec<String>) -> Self {
        self.authentication = Some(AgentAuthentication {
            schemes,
            credentials: None,
        });
        self
    }

    /// Add a skill.
    pub fn with_skill(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        self.skills.push(AgentSkill {
            id: id.into(),
            name: name.into(),
            description: Some(description.into()),
            tags: Some(tags),
            examples: None,
            input_modes: None,
            output_modes: None,
        });
        self
    }

    /// Set default input modes.
    pub fn with_input_modes(mut self, modes: Vec<String>) -> Self {
        self.default_input_modes = modes;
        self
    }

    /// Set default output modes.
    pub fn with_output_modes(mut self, modes: Vec<String>) -> Self {
        self.default_output_modes = modes;
        self
    }

    /// Build the agent card.
    pub fn build(self) -> AgentCard {
        AgentCard {
            name: self.name,
            description: self.description,
            url: self.url,
            provider: self.provider,
            version: self.version,
            documentation_url: self.documentation_url,
            capabilities: self.capabilities,
            authentication: self.authentication,
            default_input_modes: self.default_input_modes,
            default_output_modes: self.default_output_modes,
            skills: self.skills,
        }
    }
}

/// Builder for constructing [`A2AClient`] with custom configuration.
///
/// The builder's target is either a known endpoint ([`build`](Self::build))
/// or an agent reference to discover first ([`resolve`](Self::resolve)).
///
/// # Example
///
/// ```no_run
/// # async fn example() -> agentic_a2a::A2AResult<()> {
/// use agentic_a2a::builders::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("did:web:localhost%3A3003#a2a-coder")
///     .with_timeout(Duration::from_secs(30))
///     .with_bearer_token("secret")
///     .resolve()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "client")]
#[derive(Clone)]
pub struct ClientBuilder {
    url: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    headers: HashMap<String, String>,
    auth: Option<Arc<dyn AuthenticationHandler>>,
    fetch: Option<Arc<dyn HttpFetch>>,
}

#[cfg(feature = "client")]
impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("auth", &self.auth.is_some())
            .field("fetch", &self.fetch.is_some())
            .finish()
    }
}

#[cfg(feature = "client")]
impl ClientBuilder {
    /// Create a new client builder for an endpoint URL or agent reference.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            connect_timeout: None,
            headers: HashMap::new(),
            auth: None,
            fetch: None,
        }
    }

    /// Set the total request timeout. Applies to SSE streams too, so leave
    /// it unset for long-running subscriptions.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Add a custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add an Authorization header with a bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", token.into()),
        );
        self
    }

    /// Add an API key header.
    pub fn with_api_key(
        mut self,
        header_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.headers.insert(header_name.into(), api_key.into());
        self
    }

    /// Use an authentication handler for JSON-RPC calls.
    pub fn with_auth_handler(mut self, handler: Arc<dyn AuthenticationHandler>) -> Self {
        self.auth = Some(handler);
        self
    }

    /// Use a custom network function instead of [`ReqwestFetch`].
    ///
    /// Timeouts then are the fetcher's own business; headers are still added.
    pub fn with_fetch(mut self, fetch: Arc<dyn HttpFetch>) -> Self {
        self.fetch = Some(fetch);
        self
    }

    /// Build a client posting directly to the configured endpoint URL.
    ///
    /// # Errors
    ///
    /// [`A2AError::Config`] if the URL or a header is invalid.
    pub fn build(self) -> A2AResult<A2AClient> {
        url::Url::parse(&self.url)?;
        let fetch = self.http_fetch()?;
        Ok(A2AClient::with_rpc_client(self.rpc_client(&self.url, fetch)))
    }

    /// Treat the configured URL as an agent reference (DID or URL), resolve
    /// it, and build a client for the discovered endpoint.
    ///
    /// Discovery requests go through the same fetcher and headers, but not
    /// through the authentication handler.
    pub async fn resolve(self) -> A2AResult<A2AClient> {
        let fetch = self.http_fetch()?;
        let context = AgentResolver::with_http_fetch(fetch.clone())
            .resolve(&self.url)
            .await?;
        tracing::debug!(
            "resolved {} to endpoint {}",
            self.url,
            context.endpoint()
        );
        Ok(
            A2AClient::with_rpc_client(self.rpc_client(context.endpoint(), fetch))
                .with_agent_card(context.agent_card),
        )
    }

    fn rpc_client(&self, endpoint: &str, fetch: Arc<dyn HttpFetch>) -> JsonRpcClient {
        let rpc = JsonRpcClient::new(endpoint, fetch);
        match &self.auth {
            Some(auth) => rpc.with_auth_handler(auth.clone()),
            None => rpc,
        }
    }

    fn http_fetch(&self) -> A2AResult<Arc<dyn HttpFetch>> {
        for (name, value) in &self.headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| A2AError::Config(format!("invalid header name {name:?}: {e}")))?;
            reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| A2AError::Config(format!("invalid value for header {name}: {e}")))?;
        }

        if let Some(fetch) = &self.fetch {
            if self.headers.is_empty() {
                return Ok(fetch.clone());
            }
            return Ok(Arc::new(DefaultHeaders {
                inner: fetch.clone(),
                headers: self.headers.clone(),
            }));
        }

        let defaults = FetchConfig::default();
        Ok(Arc::new(ReqwestFetch::with_config(FetchConfig {
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            timeout: self.timeout,
            headers: self.headers.clone(),
        })))
    }
}

/// Adds builder headers to every request of a caller-supplied fetcher.
/// Headers set on the request itself win.
#[cfg(feature = "client")]
struct DefaultHeaders {
    inner: Arc<dyn HttpFetch>,
    headers: HashMap<String, String>,
}

#[cfg(feature = "client")]
#[async_trait]
impl HttpFetch for DefaultHeaders {
    async fn fetch(&self, mut request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| request.header(name).is_none())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.append(&mut request.headers);
        request.headers = headers;
        self.inner.fetch(request).await
    }
}
