use serde::Deserialize;

/// Main configuration structure for Peer-Ripple
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub exclude: Vec<ExclusionEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Wall-clock budget for one robots.txt check (seconds)
    #[serde(rename = "policy-timeout-secs", default = "default_policy_timeout")]
    pub policy_timeout_secs: u64,

    /// Timeout for the peers request (seconds)
    #[serde(rename = "peers-timeout-secs", default = "default_peers_timeout")]
    pub peers_timeout_secs: u64,

    /// TCP connect timeout shared by every request (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Scheme used to fetch robots.txt
    #[serde(rename = "policy-scheme", default = "default_policy_scheme")]
    pub policy_scheme: String,

    /// Scheme used to fetch the peers endpoint
    #[serde(rename = "peers-scheme", default = "default_peers_scheme")]
    pub peers_scheme: String,

    /// Path of the peers endpoint under each site's origin
    #[serde(rename = "peers-path", default = "default_peers_path")]
    pub peers_path: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            policy_timeout_secs: default_policy_timeout(),
            peers_timeout_secs: default_peers_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            policy_scheme: default_policy_scheme(),
            peers_scheme: default_peers_scheme(),
            peers_path: default_peers_path(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite checkpoint database
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path to the append-only Prolog fact log
    #[serde(rename = "facts-path", default = "default_facts_path")]
    pub facts_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            facts_path: default_facts_path(),
        }
    }
}

/// Operator-requested exclusion, matched as a plain hostname suffix
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusionEntry {
    pub suffix: String,
}

fn default_policy_timeout() -> u64 {
    10
}

fn default_peers_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_policy_scheme() -> String {
    "http".to_string()
}

fn default_peers_scheme() -> String {
    "https".to_string()
}

fn default_peers_path() -> String {
    "/api/v1/instance/peers".to_string()
}

fn default_crawler_name() -> String {
    "peer-ripple".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/peer-ripple".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}

fn default_database_path() -> String {
    "./peers.db".to_string()
}

fn default_facts_path() -> String {
    "./peers.pl".to_string()
}
