//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `HostState`: Lifecycle of a single host (unknown, pending, visited)
//! - `Frontier`: The visited and pending sets owned by the crawl engine

mod frontier;
mod host_state;

// Re-export main types
pub use frontier::Frontier;
pub use host_state::HostState;
