//! Output handler traits and types

use crate::host::Host;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for discovered edges
///
/// Implementations must never truncate or reorder what was written before.
/// A failed append is fatal to the crawl.
pub trait FactSink {
    /// Records that `source` declares `target` as a federation peer
    fn append(&mut self, source: &Host, target: &Host) -> OutputResult<()>;

    /// Makes every fact appended so far durable
    ///
    /// Called once per examined host, before the checkpoint that marks the
    /// host visited is written.
    fn sync(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
