//! Time-bounded robots.txt gate
//!
//! A robots.txt fetch can hang on a misbehaving server. The gate runs the
//! fetch on its own task, waits for at most a fixed budget, and aborts the
//! task if the budget runs out. Every failure is a refusal.

use crate::crawler::{classify_transport_error, TransportFailure};
use crate::host::Host;
use crate::robots::parser::{ParsedRobots, ROBOTS_AGENT};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

/// Reference wall-clock budget for one policy check
pub const DEFAULT_POLICY_BUDGET: Duration = Duration::from_secs(10);

/// Robots bodies beyond this many bytes are ignored, as major crawlers do
pub const MAX_POLICY_BYTES: usize = 500 * 1024;

/// Reasons a robots.txt could not be obtained
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Could not decode {url}")]
    Encoding { url: String },

    #[error("Bad status line for {url}")]
    BadStatusLine { url: String },

    #[error("Connection reset in {url}")]
    ConnectionReset { url: String },

    #[error("Invalid URL {url}")]
    InvalidUrl { url: String },

    #[error("Could not reach {url}")]
    Unreachable { url: String },

    #[error("Timed out reading {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl PolicyError {
    fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        let url = url.to_string();
        match classify_transport_error(err) {
            TransportFailure::Timeout => Self::Timeout { url },
            TransportFailure::ConnectionReset => Self::ConnectionReset { url },
            TransportFailure::BadStatusLine => Self::BadStatusLine { url },
            TransportFailure::Unreachable => Self::Unreachable { url },
            TransportFailure::InvalidRequest => Self::InvalidUrl { url },
            TransportFailure::Decode => Self::Encoding { url },
            TransportFailure::Other(message) => Self::Transport { url, message },
        }
    }
}

/// Something that can produce a site's robots policy
///
/// The returned future runs on its own task inside [`PolicyGate`], hence the
/// `Clone + Send + 'static` requirements.
pub trait PolicySource: Clone + Send + Sync + 'static {
    fn fetch_policy(
        &self,
        site: &Host,
    ) -> impl Future<Output = Result<ParsedRobots, PolicyError>> + Send;
}

/// Fetches robots.txt over HTTP
#[derive(Debug, Clone)]
pub struct HttpPolicySource {
    client: Client,
    scheme: String,
}

impl HttpPolicySource {
    /// Creates a source fetching `{scheme}://{site}/robots.txt`
    pub fn new(client: Client, scheme: impl Into<String>) -> Self {
        Self {
            client,
            scheme: scheme.into(),
        }
    }

    /// Builds the robots.txt URL for a site
    pub fn robots_url(&self, site: &Host) -> Result<Url, PolicyError> {
        let raw = format!("{}://{}/robots.txt", self.scheme, site);
        Url::parse(&raw).map_err(|_| PolicyError::InvalidUrl { url: raw })
    }
}

impl PolicySource for HttpPolicySource {
    async fn fetch_policy(&self, site: &Host) -> Result<ParsedRobots, PolicyError> {
        let robots_url = self.robots_url(site)?;
        let url_str = robots_url.to_string();

        let response = self
            .client
            .get(robots_url)
            .send()
            .await
            .map_err(|e| PolicyError::from_transport(&url_str, &e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered {} for robots.txt", site, status);
            return Ok(ParsedRobots::for_status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PolicyError::from_transport(&url_str, &e))?;

        let text = decode_policy(&body).ok_or(PolicyError::Encoding { url: url_str })?;

        Ok(ParsedRobots::from_content(text))
    }
}

/// Decodes at most [`MAX_POLICY_BYTES`] of a robots body as UTF-8
///
/// A character split by the cut is dropped; any other invalid byte fails.
fn decode_policy(body: &[u8]) -> Option<&str> {
    let kept = &body[..body.len().min(MAX_POLICY_BYTES)];
    match std::str::from_utf8(kept) {
        Ok(text) => Some(text),
        Err(e) if e.error_len().is_none() && kept.len() < body.len() => {
            std::str::from_utf8(&kept[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}

/// Fail-closed, time-bounded robots.txt check
#[derive(Debug, Clone)]
pub struct PolicyGate<S> {
    source: S,
    budget: Duration,
}

impl<S: PolicySource> PolicyGate<S> {
    /// Creates a gate that gives each check at most `budget`
    pub fn new(source: S, budget: Duration) -> Self {
        Self { source, budget }
    }

    /// Decides whether `url` on `site` may be fetched
    ///
    /// Returns within the budget (plus scheduling slack) no matter what the
    /// underlying fetch does, provided the runtime has a free worker to run
    /// the timer. Timeouts, fetch errors and a check that dies
    /// without answering all yield `false`.
    pub async fn allowed(&self, site: &Host, url: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        let source = self.source.clone();
        let task_site = site.clone();
        let task_url = url.to_string();

        let handle = tokio::spawn(async move {
            let decision = match source.fetch_policy(&task_site).await {
                // Matching is synchronous; keep it off the async workers.
                Ok(robots) => tokio::task::spawn_blocking(move || {
                    robots.can_fetch(ROBOTS_AGENT, &task_url)
                })
                .await
                .unwrap_or(false),
                Err(e) => {
                    tracing::warn!("{}. Being kind and not scanning.", e);
                    false
                }
            };
            // The receiver is gone if the caller already gave up.
            let _ = tx.send(decision);
        });

        match tokio::time::timeout(self.budget, rx).await {
            Ok(Ok(decision)) => {
                tracing::debug!("robots.txt for {} decided {} for {}", site, decision, url);
                decision
            }
            Ok(Err(_)) => {
                tracing::warn!(
                    "robots.txt check for {} ended without a decision. Not scanning.",
                    site
                );
                false
            }
            Err(_) => {
                tracing::warn!(
                    "Took more than {:?} to read robots.txt for {}. Killing and returning no.",
                    self.budget,
                    site
                );
                // Cancellation lands at the task's next await point. Not waiting
                // for it keeps this call bounded even if the task never yields.
                handle.abort();
                false
            }
        }
    }
}
