//! Peer-Ripple: a polite federation graph mapper
//!
//! This crate discovers the federation graph of a network of independently
//! operated servers. Starting from a seed host it asks every known server for
//! its declared peers, expands a frontier of unknown servers until none remain,
//! and emits one relational fact per discovered edge. The crawl honors each
//! site's robots.txt, absorbs unreachable or malformed hosts, and checkpoints
//! after every host so it can be interrupted and resumed.

pub mod config;
pub mod crawler;
pub mod host;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Peer-Ripple operations
///
/// Only failures that make the checkpoint untrustworthy end up here. Anything
/// local to one host is absorbed inside the crawl loop instead.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Fact log error: {0}")]
    FactLog(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclusion suffix: {0}")]
    InvalidSuffix(String),
}

/// Result type alias for Peer-Ripple operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlReport};
pub use host::{ExclusionFilter, Host};
pub use state::{Frontier, HostState};
