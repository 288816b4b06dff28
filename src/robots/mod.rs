//! Robots.txt handling module
//!
//! This module provides fetching and parsing of robots.txt files and the
//! time-bounded gate every peers request has to pass through. Policy is
//! fail-closed: anything short of a clear "allowed" is a refusal.

mod gate;
mod parser;

pub use gate::{
    HttpPolicySource, PolicyError, PolicyGate, PolicySource, DEFAULT_POLICY_BUDGET,
    MAX_POLICY_BYTES,
};
pub use parser::{ParsedRobots, ROBOTS_AGENT};
