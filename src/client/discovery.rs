//! Agent discovery: turn an agent reference into an endpoint and its card.
//!
//! A reference is either an HTTP(S) URL of the agent's endpoint (or of its
//! card), or a `did:web` DID with a fragment naming the agent's entry in the
//! DID document's `service` array, e.g. `did:web:example.com:users:2#a2a-coder`.
//!
//! Card locations, in order of precedence:
//! 1. the URL itself if its path already ends in `/agent.json`
//! 2. `/.well-known/agent.json` if the path is `/`
//! 3. `agent.json` next to the endpoint (relative resolution)

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{A2AError, A2AResult};
use crate::types::{AgentCard, DidDocument, DidService};

use super::transport::{HttpFetch, HttpRequest, ReqwestFetch};

/// File name of an agent card.
const AGENT_CARD_FILE: &str = "agent.json";

/// Card location for agents served at the root of a host.
const WELL_KNOWN_AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Service type that marks an A2A agent in a DID document.
const A2A_SERVICE_TYPE: &str = "A2A";

// ============================================================================
// References
// ============================================================================

/// A parsed agent reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReference {
    /// A DID, split at `#`. `fragment` is `None` when missing or empty.
    Did {
        /// The DID without its fragment.
        did: String,
        /// The fragment naming the agent, without the `#`.
        fragment: Option<String>,
    },
    /// An HTTP(S) URL of the agent endpoint or agent card.
    Url(Url),
}

impl AgentReference {
    /// Parse a reference. The scheme token before the first `:` decides
    /// whether it is a DID (`did`, any ASCII case).
    pub fn parse(reference: &str) -> A2AResult<Self> {
        let reference = reference.trim();
        let is_did = reference
            .split_once(':')
            .is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("did"));

        if is_did {
            let (did, fragment) = match reference.split_once('#') {
                Some((did, fragment)) => (did, Some(fragment)),
                None => (reference, None),
            };
            return Ok(AgentReference::Did {
                did: did.to_string(),
                fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
            });
        }

        Url::parse(reference)
            .map(AgentReference::Url)
            .map_err(|e| A2AError::Resolution(format!("invalid agent reference {reference}: {e}")))
    }
}

impl FromStr for AgentReference {
    type Err = A2AError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AgentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentReference::Did {
                did,
                fragment: Some(fragment),
            } => write!(f, "{did}#{fragment}"),
            AgentReference::Did { did, fragment: None } => write!(f, "{did}"),
            AgentReference::Url(url) => write!(f, "{url}"),
        }
    }
}

/// URL of the DID document for a `did:web` DID.
///
/// The first method-specific segment is the percent-decoded host (so
/// `localhost%3A3003` becomes `localhost:3003`); further segments form the
/// path. Loopback hosts are fetched over `http`, everything else over
/// `https`. Fragment and query are ignored.
///
/// ```
/// use agentic_a2a::client::did_web_to_url;
///
/// let url = did_web_to_url("did:web:localhost%3A3003#a2a-coder").unwrap();
/// assert_eq!(url.as_str(), "http://localhost:3003/.well-known/did.json");
///
/// let url = did_web_to_url("did:web:example.com:users:2").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/users/2/did.json");
/// ```
pub fn did_web_to_url(did: &str) -> A2AResult<Url> {
    let did = did.split(['#', '?']).next().unwrap_or_default();

    let mut parts = did.splitn(3, ':');
    let scheme = parts.next().unwrap_or_default();
    let method = parts.next().unwrap_or_default();
    let specific = parts.next().unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("did") {
        return Err(A2AError::Resolution(format!("not a DID: {did}")));
    }
    if !method.eq_ignore_ascii_case("web") {
        return Err(A2AError::Resolution(format!(
            "unsupported DID method '{method}' in {did}"
        )));
    }

    let mut segments = specific.split(':').map(|segment| {
        urlencoding::decode(segment)
            .map(|decoded| decoded.into_owned())
            .map_err(|e| A2AError::Resolution(format!("invalid DID segment in {did}: {e}")))
    });
    let host = segments.next().transpose()?.unwrap_or_default();
    if host.is_empty() {
        return Err(A2AError::Resolution(format!("DID has no host: {did}")));
    }
    let path = segments.collect::<A2AResult<Vec<_>>>()?;

    let scheme = if is_loopback(&host) { "http" } else { "https" };
    let location = if path.is_empty() {
        format!("{scheme}://{host}/.well-known/did.json")
    } else {
        format!("{scheme}://{host}/{}/did.json", path.join("/"))
    };

    Url::parse(&location)
        .map_err(|e| A2AError::Resolution(format!("DID {did} maps to invalid URL {location}: {e}")))
}

fn is_loopback(host: &str) -> bool {
    let name = if host.starts_with('[') {
        host.split_inclusive(']').next().unwrap_or(host)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    matches!(
        name.to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "[::1]"
    )
}

/// Where to fetch the agent card for an agent URL.
///
/// ```
/// use agentic_a2a::client::agent_card_url;
/// use url::Url;
///
/// let at = |s: &str| agent_card_url(&Url::parse(s).unwrap()).unwrap().to_string();
/// assert_eq!(at("https://a.example/"), "https://a.example/.well-known/agent.json");
/// assert_eq!(at("https://a.example/x/agent.json"), "https://a.example/x/agent.json");
/// assert_eq!(at("https://a.example/users/2/coder/"), "https://a.example/users/2/coder/agent.json");
/// assert_eq!(at("https://a.example/users/2/coder"), "https://a.example/users/2/agent.json");
/// ```
pub fn agent_card_url(agent_url: &Url) -> A2AResult<Url> {
    let path = agent_url.path();
    let joined = if path.ends_with("/agent.json") {
        return Ok(agent_url.clone());
    } else if path == "/" {
        agent_url.join(WELL_KNOWN_AGENT_CARD_PATH)
    } else {
        agent_url.join(AGENT_CARD_FILE)
    };
    joined.map_err(|e| {
        A2AError::Resolution(format!("cannot locate agent card for {agent_url}: {e}"))
    })
}

// ============================================================================
// Document fetching
// ============================================================================

/// Fetches JSON documents during discovery.
#[async_trait]
pub trait JsonDocumentFetcher: Send + Sync {
    /// GET `url` and parse the body as JSON.
    async fn fetch_json(&self, url: &Url) -> A2AResult<serde_json::Value>;
}

/// [`JsonDocumentFetcher`] over any [`HttpFetch`].
#[derive(Clone)]
pub struct HttpJsonFetcher {
    fetch: Arc<dyn HttpFetch>,
}

impl fmt::Debug for HttpJsonFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJsonFetcher").finish_non_exhaustive()
    }
}

impl HttpJsonFetcher {
    /// Fetch documents through `fetch`.
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self { fetch }
    }
}

impl Default for HttpJsonFetcher {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestFetch::new()))
    }
}

#[async_trait]
impl JsonDocumentFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, url: &Url) -> A2AResult<serde_json::Value> {
        let request = HttpRequest::get(url.as_str()).with_header("Accept", "application/json");
        let mut response = self
            .fetch
            .fetch(request)
            .await
            .map_err(|e| A2AError::Transport(format!("failed to fetch {url}: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read {url}: {e}")))?;

        if !response.is_success() {
            return Err(A2AError::Http {
                status: response.status(),
                reason: response.reason().to_string(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| A2AError::InvalidJson(format!("document at {url} is not JSON: {e}")))
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Everything learned while resolving an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentContext {
    /// DID document URL; set only for DID references.
    pub profile_url: Option<Url>,
    /// The fetched DID document; set only for DID references.
    pub agentic_profile: Option<DidDocument>,
    /// The agent URL the card location was derived from (the reference
    /// itself, or the service endpoint from the DID document).
    pub agent_url: Url,
    /// Where the agent card was fetched from.
    pub agent_card_url: Url,
    /// The agent card.
    pub agent_card: AgentCard,
}

impl AgentContext {
    /// The JSON-RPC endpoint to talk to.
    ///
    /// The agent URL, unless it points at the card itself; then the card's
    /// `url` wins when it declares one.
    pub fn endpoint(&self) -> &str {
        if self.agent_url.path().ends_with("/agent.json") {
            if let Some(url) = self.agent_card.url.as_deref().filter(|u| !u.is_empty()) {
                return url;
            }
        }
        self.agent_url.as_str()
    }
}

/// Resolves agent references into [`AgentContext`]s.
///
/// # Example
///
/// ```no_run
/// use agentic_a2a::client::AgentResolver;
///
/// # async fn example() -> agentic_a2a::A2AResult<()> {
/// let resolver = AgentResolver::new();
/// let context = resolver.resolve("did:web:localhost%3A3003#a2a-coder").await?;
/// println!("{} at {}", context.agent_card.name, context.endpoint());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AgentResolver {
    fetcher: Arc<dyn JsonDocumentFetcher>,
}

impl fmt::Debug for AgentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentResolver").finish_non_exhaustive()
    }
}

impl Default for AgentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentResolver {
    /// A resolver fetching documents with a default [`ReqwestFetch`].
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(HttpJsonFetcher::default()))
    }

    /// A resolver fetching documents through `fetch`.
    pub fn with_http_fetch(fetch: Arc<dyn HttpFetch>) -> Self {
        Self::with_fetcher(Arc::new(HttpJsonFetcher::new(fetch)))
    }

    /// A resolver with a custom document fetcher.
    pub fn with_fetcher(fetcher: Arc<dyn JsonDocumentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve a reference to its endpoint and agent card.
    ///
    /// # Errors
    ///
    /// [`A2AError::Resolution`] when a DID has no fragment (checked before
    /// any request), no service matches the fragment, the service is not
    /// of type `A2A`, or it has no endpoint. Fetch failures surface as
    /// [`A2AError::Transport`], [`A2AError::Http`] or [`A2AError::InvalidJson`].
    pub async fn resolve(&self, reference: &str) -> A2AResult<AgentContext> {
        let (profile_url, agentic_profile, agent_url) = match AgentReference::parse(reference)? {
            AgentReference::Url(url) => (None, None, url),
            AgentReference::Did { did, fragment } => {
                let fragment = fragment.ok_or_else(|| {
                    A2AError::Resolution(format!(
                        "Agentic profile DID is missing the fragment to resolve the agent {reference}"
                    ))
                })?;
                let profile_url = did_web_to_url(&did)?;
                tracing::debug!("fetching agentic profile for {} from {}", did, profile_url);
                let profile: DidDocument = self.fetch_as(&profile_url, "DID document").await?;
                let agent_url = agent_endpoint(&profile, &did, &fragment, &profile_url)?;
                (Some(profile_url), Some(profile), agent_url)
            }
        };

        let agent_card_url = agent_card_url(&agent_url)?;
        tracing::debug!("resolving agent card for {} from {}", agent_url, agent_card_url);
        let agent_card: AgentCard = self.fetch_as(&agent_card_url, "agent card").await?;

        Ok(AgentContext {
            profile_url,
            agentic_profile,
            agent_url,
            agent_card_url,
            agent_card,
        })
    }

    async fn fetch_as<T: DeserializeOwned>(&self, url: &Url, what: &str) -> A2AResult<T> {
        let value = self.fetcher.fetch_json(url).await?;
        serde_json::from_value(value)
            .map_err(|e| A2AError::InvalidJson(format!("invalid {what} at {url}: {e}")))
    }
}

/// Find the A2A service named by `fragment` and return its endpoint.
fn agent_endpoint(
    profile: &DidDocument,
    did: &str,
    fragment: &str,
    profile_url: &Url,
) -> A2AResult<Url> {
    let short_id = format!("#{fragment}");
    let full_id = format!("{did}#{fragment}");

    let service: DidService = profile
        .find_service(&[short_id.as_str(), full_id.as_str()])
        .ok_or_else(|| {
            A2AError::Resolution(format!(
                "Failed to find agent {short_id} from agentic profile at {profile_url}"
            ))
        })?
        .map_err(|e| {
            A2AError::Resolution(format!(
                "Agent {short_id} from {profile_url} has an invalid service entry: {e}"
            ))
        })?;

    if !service.has_type(A2A_SERVICE_TYPE) {
        let service_type = service
            .service_type
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        return Err(A2AError::Resolution(format!(
            "Agent type is not A2A, instead it is {service_type}"
        )));
    }

    let endpoint = service.endpoint_url().ok_or_else(|| {
        A2AError::Resolution(format!(
            "Agent {short_id} from {profile_url} is missing the serviceEndpoint"
        ))
    })?;

    Url::parse(endpoint).map_err(|e| {
        A2AError::Resolution(format!(
            "Agent {short_id} from {profile_url} has an invalid serviceEndpoint {endpoint}: {e}"
        ))
    })
}

/// Resolve a reference with the default HTTP fetcher.
pub async fn resolve_agent(reference: &str) -> A2AResult<AgentContext> {
    AgentResolver::new().resolve(reference).await
}
