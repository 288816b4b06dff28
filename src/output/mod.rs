//! Output module for emitting crawl results
//!
//! This module handles:
//! - The append-only Prolog fact log of discovered edges
//! - Crawl statistics for the `--stats` mode

mod prolog;
pub mod stats;
mod traits;

pub use prolog::{count_facts, escape_atom, format_fact, PrologFactLog};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{FactSink, OutputError, OutputResult};
