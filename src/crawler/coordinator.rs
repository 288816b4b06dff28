//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the only loop in the crawler. It owns the frontier
//! and, one host at a time:
//! - marks the host visited before any network activity
//! - asks the peer source for the host's peers, absorbing every failure
//! - filters and merges the peers into the frontier
//! - appends one fact per edge and checkpoints the frontier

use crate::crawler::fetcher::PeerSource;
use crate::host::{ExclusionFilter, Host};
use crate::output::FactSink;
use crate::state::Frontier;
use crate::storage::FrontierStore;
use crate::RippleError;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;

/// Counters describing one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Hosts whose peers were requested
    pub hosts_examined: u64,
    /// Hosts popped but skipped by the exclusion filter
    pub hosts_excluded: u64,
    /// Examined hosts whose peer discovery failed
    pub hosts_failed: u64,
    /// Hosts newly added to pending
    pub hosts_queued: u64,
    /// Facts appended to the fact log
    pub edges_written: u64,
}

impl CrawlReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            hosts_examined: 0,
            hosts_excluded: 0,
            hosts_failed: 0,
            hosts_queued: 0,
            edges_written: 0,
        }
    }
}

/// What a single crawl step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Pending was empty; the final checkpoint has been written
    Drained,
    /// The popped host matched the exclusion filter and was not fetched
    Excluded(Host),
    /// The popped host was examined
    Examined {
        host: Host,
        /// Peers kept after filtering (one fact each)
        peers: usize,
        /// Peers that were newly queued
        queued: usize,
    },
}

/// Main crawl engine structure
pub struct CrawlEngine<P, S, F> {
    frontier: Frontier,
    peers: P,
    exclusion: ExclusionFilter,
    store: S,
    sink: F,
    report: CrawlReport,
}

impl<P, S, F> CrawlEngine<P, S, F>
where
    P: PeerSource,
    S: FrontierStore,
    F: FactSink,
{
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `frontier` - The starting frontier (seeded or loaded from a checkpoint)
    /// * `peers` - Peer discovery for one site
    /// * `exclusion` - Hosts that must never be visited
    /// * `store` - Checkpoint persistence
    /// * `sink` - Fact log receiving one record per edge
    pub fn new(frontier: Frontier, peers: P, exclusion: ExclusionFilter, store: S, sink: F) -> Self {
        Self {
            frontier,
            peers,
            exclusion,
            store,
            sink,
            report: CrawlReport::start(),
        }
    }

    /// Returns the current frontier
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Returns the counters collected so far
    pub fn report(&self) -> &CrawlReport {
        &self.report
    }

    /// Consumes the engine, handing back the checkpoint store and fact sink
    pub fn into_parts(self) -> (Frontier, S, F) {
        (self.frontier, self.store, self.sink)
    }

    /// Runs the crawl until the frontier drains
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The frontier drained
    /// * `Err(RippleError)` - The fact log or the checkpoint could not be written
    pub async fn run(&mut self) -> Result<CrawlReport, RippleError> {
        tracing::info!(
            "Starting crawl with {} sites seen, {} sites remaining",
            self.frontier.visited_len(),
            self.frontier.pending_len()
        );

        while self.step().await? != StepOutcome::Drained {}

        self.report.finished_at = Some(Utc::now());
        tracing::info!(
            "Crawl drained: {} sites examined, {} excluded, {} without peers, {} facts written",
            self.report.hosts_examined,
            self.report.hosts_excluded,
            self.report.hosts_failed,
            self.report.edges_written
        );
        Ok(self.report.clone())
    }

    /// Processes at most one host
    pub async fn step(&mut self) -> Result<StepOutcome, RippleError> {
        let host = match self.frontier.pop_next() {
            Some(host) => host,
            None => {
                self.store.save(&self.frontier)?;
                return Ok(StepOutcome::Drained);
            }
        };

        if self.exclusion.is_excluded_host(&host) {
            tracing::info!("Skipping excluded site {}", host);
            self.report.hosts_excluded += 1;
            return Ok(StepOutcome::Excluded(host));
        }

        tracing::info!(
            "Examining site {}. {} sites seen, {} sites remaining.",
            host,
            self.frontier.visited_len(),
            self.frontier.pending_len()
        );
        self.report.hosts_examined += 1;

        let raw = self.discover(&host).await;

        let new_peers: BTreeSet<Host> = self.exclusion.admit(raw).into_iter().collect();
        let queued = self.frontier.merge(&new_peers);
        self.report.hosts_queued += queued as u64;

        for peer in &new_peers {
            self.sink.append(&host, peer)?;
        }
        if !new_peers.is_empty() {
            self.sink.sync()?;
        }
        self.report.edges_written += new_peers.len() as u64;

        self.store.save(&self.frontier)?;
        tracing::debug!(
            "Checkpoint saved after {}: {} peers, {} newly queued",
            host,
            new_peers.len(),
            queued
        );

        Ok(StepOutcome::Examined {
            host,
            peers: new_peers.len(),
            queued,
        })
    }

    /// Asks the peer source for a host's peers, turning every failure into an empty list
    async fn discover(&mut self, host: &Host) -> Vec<Option<String>> {
        let attempt = AssertUnwindSafe(self.peers.fetch_peers(host))
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(peers)) => peers,
            Ok(Err(reason)) => {
                tracing::warn!("Error: {} {}", host, reason);
                self.report.hosts_failed += 1;
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Exception happened while examining {}. Skipping.", host);
                self.report.hosts_failed += 1;
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::PeerError;
    use crate::output::OutputResult;
    use crate::state::HostState;
    use crate::storage::StorageResult;
    use std::collections::HashMap;

    fn host(name: &str) -> Host {
        Host::parse(name).unwrap()
    }

    /// Canned answers per site; sites without an entry are unreachable
    #[derive(Default)]
    struct FakePeers {
        answers: HashMap<String, FakeAnswer>,
    }

    enum FakeAnswer {
        Peers(Vec<&'static str>),
        Denied,
        Panic,
    }

    impl FakePeers {
        fn with(mut self, site: &str, answer: FakeAnswer) -> Self {
            self.answers.insert(site.to_string(), answer);
            self
        }
    }

    impl PeerSource for FakePeers {
        async fn fetch_peers(&self, site: &Host) -> Result<Vec<Option<String>>, PeerError> {
            match self.answers.get(site.as_str()) {
                Some(FakeAnswer::Peers(peers)) => {
                    Ok(peers.iter().map(|p| Some(p.to_string())).collect())
                }
                Some(FakeAnswer::Denied) => Err(PeerError::RobotsDenied),
                Some(FakeAnswer::Panic) => panic!("peer source exploded"),
                None => Err(PeerError::Unreachable("connection refused".to_string())),
            }
        }
    }

    /// Records every checkpoint it is given
    #[derive(Default)]
    struct MemoryStore {
        saved: Vec<Frontier>,
        fail: bool,
    }

    impl FrontierStore for MemoryStore {
        fn load(&self) -> StorageResult<Frontier> {
            Ok(self.saved.last().cloned().unwrap_or_default())
        }

        fn save(&mut self, frontier: &Frontier) -> StorageResult<()> {
            if self.fail {
                return Err(crate::storage::StorageError::Database(
                    "disk full".to_string(),
                ));
            }
            self.saved.push(frontier.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySink {
        facts: Vec<(String, String)>,
        /// Facts covered by the last sync
        synced: usize,
        syncs: usize,
        fail: bool,
    }

    impl FactSink for MemorySink {
        fn append(&mut self, source: &Host, target: &Host) -> OutputResult<()> {
            if self.fail {
                return Err(crate::output::OutputError::Write("read-only".to_string()));
            }
            self.facts
                .push((source.to_string(), target.to_string()));
            Ok(())
        }

        fn sync(&mut self) -> OutputResult<()> {
            self.synced = self.facts.len();
            self.syncs += 1;
            Ok(())
        }
    }

    fn engine(
        frontier: Frontier,
        peers: FakePeers,
    ) -> CrawlEngine<FakePeers, MemoryStore, MemorySink> {
        CrawlEngine::new(
            frontier,
            peers,
            ExclusionFilter::builtin(),
            MemoryStore::default(),
            MemorySink::default(),
        )
    }

    fn three_host_sources() -> FakePeers {
        FakePeers::default()
            .with("a.example", FakeAnswer::Peers(vec!["b.example", "c.example"]))
            .with("b.example", FakeAnswer::Denied)
            .with("c.example", FakeAnswer::Peers(vec!["a.example"]))
    }

    #[tokio::test]
    async fn test_three_host_scenario() {
        let mut engine = engine(Frontier::seeded(host("a.example")), three_host_sources());
        let report = engine.run().await.unwrap();

        let (frontier, _, sink) = engine.into_parts();
        let visited: Vec<&str> = frontier.visited().iter().map(Host::as_str).collect();
        assert_eq!(visited, vec!["a.example", "b.example", "c.example"]);
        assert!(frontier.pending().is_empty());

        let facts: Vec<(&str, &str)> = sink
            .facts
            .iter()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();
        assert_eq!(
            facts,
            vec![
                ("a.example", "b.example"),
                ("a.example", "c.example"),
                ("c.example", "a.example"),
            ]
        );

        assert_eq!(report.hosts_examined, 3);
        assert_eq!(report.hosts_failed, 1);
        assert_eq!(report.edges_written, 3);
        assert!(report.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_invariants_hold_after_every_step() {
        let mut engine = engine(Frontier::seeded(host("a.example")), three_host_sources());
        let mut previously_visited = BTreeSet::new();

        loop {
            let outcome = engine.step().await.unwrap();
            let frontier = engine.frontier();

            assert!(frontier.is_consistent());
            // Visited only grows, and nothing visited comes back as pending
            assert!(previously_visited.is_subset(frontier.visited()));
            for h in &previously_visited {
                assert_eq!(frontier.state_of(Host::as_str(h)), HostState::Visited);
            }
            previously_visited = frontier.visited().clone();

            if outcome == StepOutcome::Drained {
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_checkpoint_after_each_examined_host() {
        let mut engine = engine(Frontier::seeded(host("a.example")), three_host_sources());
        engine.run().await.unwrap();
        let (_, store, _) = engine.into_parts();

        // One save per examined host plus the final drained save
        assert_eq!(store.saved.len(), 4);
        let first = &store.saved[0];
        assert_eq!(first.state_of("a.example"), HostState::Visited);
        assert_eq!(first.state_of("b.example"), HostState::Pending);
        assert_eq!(first.state_of("c.example"), HostState::Pending);
        assert!(store.saved.iter().all(Frontier::is_consistent));
    }

    #[tokio::test]
    async fn test_facts_synced_before_checkpoint() {
        let mut engine = engine(Frontier::seeded(host("a.example")), three_host_sources());
        engine.step().await.unwrap();
        let (_, store, sink) = engine.into_parts();

        assert_eq!(store.saved.len(), 1);
        assert_eq!(sink.facts.len(), 2);
        assert_eq!(sink.synced, 2);
    }

    #[tokio::test]
    async fn test_sync_once_per_host_with_peers() {
        let mut engine = engine(Frontier::seeded(host("a.example")), three_host_sources());
        engine.run().await.unwrap();
        let (_, _, sink) = engine.into_parts();

        // a and c list peers, b is denied
        assert_eq!(sink.syncs, 2);
        assert_eq!(sink.synced, sink.facts.len());
    }

    #[tokio::test]
    async fn test_excluded_seed_terminates_immediately() {
        let peers = FakePeers::default().with("x.noho.st", FakeAnswer::Peers(vec!["b.example"]));
        let mut engine = engine(Frontier::seeded(host("x.noho.st")), peers);
        let report = engine.run().await.unwrap();

        let (frontier, store, sink) = engine.into_parts();
        assert_eq!(frontier.state_of("x.noho.st"), HostState::Visited);
        assert_eq!(frontier.visited_len(), 1);
        assert!(frontier.pending().is_empty());
        assert!(sink.facts.is_empty());
        assert_eq!(report.hosts_examined, 0);
        assert_eq!(report.hosts_excluded, 1);
        assert_eq!(store.load().unwrap(), frontier);
    }

    #[tokio::test]
    async fn test_excluded_peers_never_queued_or_recorded() {
        let peers = FakePeers::default().with(
            "a.example",
            FakeAnswer::Peers(vec![
                "spam.noho.st",
                "jpbutler.com",
                "noho.st:443",
                "jpbutler.com/",
                "noho.st?x",
                "b.example",
                "",
            ]),
        );
        let mut engine = engine(Frontier::seeded(host("a.example")), peers);
        engine.run().await.unwrap();

        let (frontier, _, sink) = engine.into_parts();
        assert_eq!(frontier.state_of("spam.noho.st"), HostState::Unknown);
        assert_eq!(frontier.state_of("jpbutler.com"), HostState::Unknown);
        assert_eq!(frontier.state_of("noho.st:443"), HostState::Unknown);
        assert_eq!(frontier.state_of("b.example"), HostState::Visited);
        assert_eq!(frontier.visited_len(), 2);
        assert_eq!(
            sink.facts,
            vec![("a.example".to_string(), "b.example".to_string())]
        );
    }

    #[tokio::test]
    async fn test_edges_recorded_for_already_known_peers() {
        let peers = FakePeers::default()
            .with("a.example", FakeAnswer::Peers(vec!["b.example"]))
            .with("b.example", FakeAnswer::Peers(vec!["a.example", "b.example"]));
        let mut engine = engine(Frontier::seeded(host("a.example")), peers);
        let report = engine.run().await.unwrap();

        let (_, _, sink) = engine.into_parts();
        assert_eq!(sink.facts.len(), 3);
        assert_eq!(report.hosts_queued, 1);
    }

    #[tokio::test]
    async fn test_peer_identifiers_are_normalized_and_deduplicated() {
        let peers = FakePeers::default().with(
            "a.example",
            FakeAnswer::Peers(vec!["B.Example", "b.example.", " b.example "]),
        );
        let mut engine = engine(Frontier::seeded(host("a.example")), peers);
        engine.run().await.unwrap();

        let (_, _, sink) = engine.into_parts();
        assert_eq!(
            sink.facts,
            vec![("a.example".to_string(), "b.example".to_string())]
        );
    }

    #[tokio::test]
    async fn test_panicking_source_does_not_abort_crawl() {
        let peers = FakePeers::default()
            .with("a.example", FakeAnswer::Peers(vec!["b.example", "c.example"]))
            .with("b.example", FakeAnswer::Panic)
            .with("c.example", FakeAnswer::Peers(vec!["d.example"]));
        let mut engine = engine(Frontier::seeded(host("a.example")), peers);
        let report = engine.run().await.unwrap();

        let (frontier, _, _) = engine.into_parts();
        assert_eq!(frontier.visited_len(), 4);
        assert_eq!(report.hosts_failed, 2); // b panicked, d is unreachable
    }

    #[tokio::test]
    async fn test_fact_log_failure_is_fatal() {
        let mut engine = CrawlEngine::new(
            Frontier::seeded(host("a.example")),
            three_host_sources(),
            ExclusionFilter::builtin(),
            MemoryStore::default(),
            MemorySink {
                fail: true,
                ..Default::default()
            },
        );
        let result = engine.run().await;
        assert!(matches!(result, Err(RippleError::FactLog(_))));
    }

    #[tokio::test]
    async fn test_checkpoint_failure_is_fatal() {
        let mut engine = CrawlEngine::new(
            Frontier::seeded(host("a.example")),
            three_host_sources(),
            ExclusionFilter::builtin(),
            MemoryStore {
                fail: true,
                ..Default::default()
            },
            MemorySink::default(),
        );
        let result = engine.run().await;
        assert!(matches!(result, Err(RippleError::Storage(_))));
    }

    #[tokio::test]
    async fn test_resume_reaches_same_visited_set() {
        // Uninterrupted
        let mut full = engine(Frontier::seeded(host("a.example")), three_host_sources());
        full.run().await.unwrap();
        let (full_frontier, _, _) = full.into_parts();

        // Interrupted after the first host, then resumed from its checkpoint
        let mut first = engine(Frontier::seeded(host("a.example")), three_host_sources());
        first.step().await.unwrap();
        let (_, store, _) = first.into_parts();
        let checkpoint = store.load().unwrap();

        let mut resumed = engine(checkpoint, three_host_sources());
        resumed.run().await.unwrap();
        let (resumed_frontier, _, _) = resumed.into_parts();

        assert_eq!(resumed_frontier.visited(), full_frontier.visited());
        assert!(resumed_frontier.pending().is_empty());
    }

    #[tokio::test]
    async fn test_empty_frontier_drains_at_once() {
        let mut engine = engine(Frontier::new(), FakePeers::default());
        assert_eq!(engine.step().await.unwrap(), StepOutcome::Drained);
    }
}
