//! HTTP fetcher implementation
//!
//! This module handles the peers request for the crawler, including:
//! - Building the shared HTTP client with a proper user agent string
//! - Consulting the robots gate before every peers request
//! - Classifying transport failures
//! - Decoding the JSON peer list

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::host::Host;
use crate::robots::{PolicyGate, PolicySource};
use reqwest::{Client, StatusCode};
use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Reference timeout for the peers request
pub const DEFAULT_PEERS_TIMEOUT: Duration = Duration::from_secs(60);

/// Reasons a site yielded no peer list
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("robots.txt does not allow reading peers")]
    RobotsDenied,

    #[error("invalid peers URL {0}")]
    InvalidUrl(String),

    #[error("did not respond to the peers request (HTTP {0})")]
    Status(u16),

    #[error("did not return JSON: {0}")]
    NotJson(String),

    #[error("could not be reached: {0}")]
    Unreachable(String),

    #[error("timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PeerError {
    fn from(err: reqwest::Error) -> Self {
        match classify_transport_error(&err) {
            TransportFailure::Timeout => Self::Timeout,
            TransportFailure::Unreachable | TransportFailure::ConnectionReset => {
                Self::Unreachable(err.to_string())
            }
            TransportFailure::InvalidRequest => Self::InvalidUrl(err.to_string()),
            TransportFailure::BadStatusLine | TransportFailure::Decode => {
                Self::Transport(err.to_string())
            }
            TransportFailure::Other(message) => Self::Transport(message),
        }
    }
}

/// Coarse classification of a failed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Request or connect timeout
    Timeout,
    /// The peer reset the connection
    ConnectionReset,
    /// The response head could not be parsed
    BadStatusLine,
    /// Connection refused, DNS failure, TLS failure
    Unreachable,
    /// The request could not be built (bad URL)
    InvalidRequest,
    /// The body could not be read or decoded
    Decode,
    /// Anything else
    Other(String),
}

/// Classifies a reqwest error by walking its source chain
///
/// # Retry Logic
///
/// There is none: every classification is final for the current attempt.
pub fn classify_transport_error(err: &reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        return TransportFailure::Timeout;
    }

    let root: &(dyn StdError + 'static) = err;
    let chain = || std::iter::successors(Some(root), |e| (*e).source());

    let reset = chain().any(|e| {
        e.downcast_ref::<io::Error>()
            .is_some_and(|io| io.kind() == io::ErrorKind::ConnectionReset)
    });
    if reset {
        return TransportFailure::ConnectionReset;
    }

    // hyper reports unparseable response heads as "invalid HTTP ..." parse errors
    let bad_head = chain().any(|e| {
        let message = e.to_string();
        message.contains("invalid HTTP") || message.contains("message head")
    });
    if bad_head {
        return TransportFailure::BadStatusLine;
    }

    if err.is_connect() {
        TransportFailure::Unreachable
    } else if err.is_builder() {
        TransportFailure::InvalidRequest
    } else if err.is_decode() || err.is_body() {
        TransportFailure::Decode
    } else {
        TransportFailure::Other(err.to_string())
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client is shared by the robots gate and the peers fetcher. It follows
/// redirects and has no global timeout; each request carries its own bound.
///
/// # Example
///
/// ```no_run
/// use peer_ripple::config::Config;
/// use peer_ripple::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Something that can list the peers a site federates with
///
/// Implementations never panic on remote misbehavior; every failure is a
/// [`PeerError`] value. The raw identifiers are returned exactly as declared,
/// `None` standing for a JSON `null`.
pub trait PeerSource {
    fn fetch_peers(
        &self,
        site: &Host,
    ) -> impl Future<Output = Result<Vec<Option<String>>, PeerError>> + Send;
}

/// Fetches `{scheme}://{site}{path}` after clearing it with the robots gate
#[derive(Debug, Clone)]
pub struct HttpPeerFetcher<S> {
    client: Client,
    gate: PolicyGate<S>,
    scheme: String,
    path: String,
    timeout: Duration,
}

impl<S: PolicySource> HttpPeerFetcher<S> {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The shared HTTP client
    /// * `gate` - The robots gate consulted before every request
    /// * `scheme` - Scheme of the peers endpoint ("https" in production)
    /// * `path` - Path of the peers endpoint
    /// * `timeout` - Bound on the peers request
    pub fn new(
        client: Client,
        gate: PolicyGate<S>,
        scheme: impl Into<String>,
        path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            gate,
            scheme: scheme.into(),
            path: path.into(),
            timeout,
        }
    }

    /// Builds the peers endpoint URL for a site
    pub fn peers_url(&self, site: &Host) -> Result<Url, PeerError> {
        let raw = format!("{}://{}{}", self.scheme, site, self.path);
        Url::parse(&raw).map_err(|_| PeerError::InvalidUrl(raw))
    }
}

impl<S: PolicySource> PeerSource for HttpPeerFetcher<S> {
    async fn fetch_peers(&self, site: &Host) -> Result<Vec<Option<String>>, PeerError> {
        let url = self.peers_url(site)?;
        tracing::debug!("url = {}", url);

        if !self.gate.allowed(site, url.as_str()).await {
            return Err(PeerError::RobotsDenied);
        }

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PeerError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<Option<String>>>(&body)
            .map_err(|e| PeerError::NotJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::robots::{HttpPolicySource, DEFAULT_POLICY_BUDGET};

    fn create_fetcher(scheme: &str) -> HttpPeerFetcher<HttpPolicySource> {
        let config = Config::default();
        let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
        let gate = PolicyGate::new(
            HttpPolicySource::new(client.clone(), "http"),
            DEFAULT_POLICY_BUDGET,
        );
        HttpPeerFetcher::new(
            client,
            gate,
            scheme,
            "/api/v1/instance/peers",
            DEFAULT_PEERS_TIMEOUT,
        )
    }

    #[test]
    fn test_build_http_client() {
        let config = Config::default();
        assert!(build_http_client(&config.user_agent, &config.crawler).is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let config = Config::default();
        let header = config.user_agent.header_value();
        assert!(header.starts_with("peer-ripple/"));
        assert!(header.contains("(+https://example.com/peer-ripple; crawler@example.com)"));
    }

    #[test]
    fn test_peers_url() {
        let fetcher = create_fetcher("https");
        let site = Host::parse("Mastodon.Social").unwrap();
        assert_eq!(
            fetcher.peers_url(&site).unwrap().as_str(),
            "https://mastodon.social/api/v1/instance/peers"
        );
    }

    #[test]
    fn test_peers_url_keeps_port() {
        let fetcher = create_fetcher("http");
        let site = Host::parse("127.0.0.1:8080").unwrap();
        assert_eq!(
            fetcher.peers_url(&site).unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/instance/peers"
        );
    }

    #[test]
    fn test_peers_url_rejects_bad_scheme() {
        let fetcher = create_fetcher("ht tp");
        let site = Host::parse("social.example").unwrap();
        assert!(matches!(
            fetcher.peers_url(&site),
            Err(PeerError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_peer_error_messages_carry_reason() {
        assert_eq!(
            PeerError::Status(404).to_string(),
            "did not respond to the peers request (HTTP 404)"
        );
        assert!(PeerError::NotJson("expected value".to_string())
            .to_string()
            .contains("expected value"));
    }

    // HTTP behavior (404, non-JSON, refused connections) is covered with
    // wiremock in tests/peer_fetch_tests.rs
}
