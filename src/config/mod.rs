//! Configuration module for Peer-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The file is optional: every field falls back to a default.
//!
//! # Example
//!
//! ```no_run
//! use peer_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Robots budget: {}s", config.crawler.policy_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ExclusionEntry, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
