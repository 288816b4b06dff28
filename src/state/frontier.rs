use crate::host::Host;
use crate::state::HostState;
use std::collections::BTreeSet;

/// The crawl's working set, split into visited and pending hosts
///
/// The two sets are kept disjoint by construction: a pending host is never
/// visited, and once a host is visited it can not be queued again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    visited: BTreeSet<Host>,
    pending: BTreeSet<Host>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh frontier containing only the seed host
    pub fn seeded(seed: Host) -> Self {
        let mut pending = BTreeSet::new();
        pending.insert(seed);
        Self {
            visited: BTreeSet::new(),
            pending,
        }
    }

    /// Rebuilds a frontier from persisted parts
    ///
    /// Any pending host that is also visited is dropped from pending.
    pub fn from_parts(visited: BTreeSet<Host>, mut pending: BTreeSet<Host>) -> Self {
        pending.retain(|host| !visited.contains(host));
        Self { visited, pending }
    }

    /// Returns the visited set
    pub fn visited(&self) -> &BTreeSet<Host> {
        &self.visited
    }

    /// Returns the pending set
    pub fn pending(&self) -> &BTreeSet<Host> {
        &self.pending
    }

    /// Number of visited hosts
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of pending hosts
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when there is nothing left to examine
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }

    /// Reports the lifecycle state of a host
    pub fn state_of(&self, host: &str) -> HostState {
        if self.visited.contains(host) {
            HostState::Visited
        } else if self.pending.contains(host) {
            HostState::Pending
        } else {
            HostState::Unknown
        }
    }

    /// Takes the next pending host and marks it visited
    ///
    /// The host is visited from this point on, whether or not its examination
    /// succeeds.
    pub fn pop_next(&mut self) -> Option<Host> {
        let host = self.pending.first()?.clone();
        debug_assert!(self
            .state_of(host.as_str())
            .can_transition_to(HostState::Visited));
        self.pending.remove(&host);
        self.visited.insert(host.clone());
        Some(host)
    }

    /// Queues every host that has not been visited yet
    ///
    /// # Returns
    ///
    /// The number of hosts that were newly added to pending
    pub fn merge<'a, I>(&mut self, hosts: I) -> usize
    where
        I: IntoIterator<Item = &'a Host>,
    {
        let mut added = 0;
        for host in hosts {
            if self
                .state_of(host.as_str())
                .can_transition_to(HostState::Pending)
            {
                self.pending.insert(host.clone());
                added += 1;
            }
        }
        added
    }

    /// Drops pending hosts for which `keep` returns false
    ///
    /// # Returns
    ///
    /// The number of hosts removed
    pub fn retain_pending<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Host) -> bool,
    {
        let before = self.pending.len();
        self.pending.retain(|host| keep(host));
        before - self.pending.len()
    }

    /// Returns true if the visited and pending sets share no host
    pub fn is_consistent(&self) -> bool {
        self.pending.is_disjoint(&self.visited)
    }
}
