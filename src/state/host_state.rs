//! Host state definitions for tracking crawl progress
//!
//! A host only ever moves forward: it is unknown until discovered, pending
//! until popped, and visited for good after that.

/// Represents where a host is in the crawl lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostState {
    /// Never seen by this crawl
    Unknown,

    /// Discovered (or seeded) and waiting to be examined
    Pending,

    /// Examined, or at least popped for examination
    Visited,
}

impl HostState {
    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Legal moves are `Unknown -> Pending` and `Pending -> Visited`.
    pub fn can_transition_to(&self, next: HostState) -> bool {
        matches!(
            (self, next),
            (Self::Unknown, Self::Pending) | (Self::Pending, Self::Visited)
        )
    }
}
