//! Crawler module for federation peer discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of peer lists behind the robots gate
//! - The sequential crawl engine and its checkpointing
//! - Wiring configuration, storage and output into a complete crawl

mod coordinator;
mod fetcher;

pub use coordinator::{CrawlEngine, CrawlReport, StepOutcome};
pub use fetcher::{
    build_http_client, classify_transport_error, HttpPeerFetcher, PeerError, PeerSource,
    TransportFailure, DEFAULT_PEERS_TIMEOUT,
};

use crate::config::Config;
use crate::host::{ExclusionFilter, Host};
use crate::output::PrologFactLog;
use crate::robots::{HttpPolicySource, PolicyGate};
use crate::state::Frontier;
use crate::storage::{open_storage, FrontierStore, RunStatus, RunStore, StorageResult};
use crate::RippleError;
use std::path::Path;
use std::time::Duration;

/// Builds the frontier a crawl starts from
///
/// With a seed the crawl starts fresh and any previous checkpoint is ignored.
/// Without one the last checkpoint is loaded, and pending hosts that the
/// exclusion filter now rejects are dropped.
pub fn initial_frontier<S: FrontierStore>(
    store: &S,
    exclusion: &ExclusionFilter,
    seed: Option<Host>,
) -> StorageResult<Frontier> {
    if let Some(seed) = seed {
        tracing::info!("Starting fresh crawl from {}", seed);
        return Ok(Frontier::seeded(seed));
    }

    let mut frontier = store.load()?;
    let dropped = frontier.retain_pending(|host| !exclusion.is_excluded_host(host));
    if dropped > 0 {
        tracing::info!("Dropped {} excluded sites from the saved frontier", dropped);
    }

    tracing::info!(
        "Resuming crawl: {} sites seen, {} sites remaining",
        frontier.visited_len(),
        frontier.pending_len()
    );
    if frontier.is_drained() {
        tracing::warn!("Nothing left to crawl. Pass a seed host to start a new crawl.");
    }

    Ok(frontier)
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the checkpoint database and build the starting frontier
/// 2. Open the fact log for appending
/// 3. Build the HTTP client, robots gate and peer fetcher
/// 4. Record a new run
/// 5. Drive the crawl engine until the frontier drains
/// 6. Close the run as completed or failed
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration text, stored with the run
/// * `seed` - Start fresh from this host, or resume when `None`
///
/// # Example
///
/// ```no_run
/// use peer_ripple::config::Config;
/// use peer_ripple::crawler::run_crawl;
/// use peer_ripple::Host;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let seed = Host::parse("mastodon.social");
/// let report = run_crawl(&config, "", seed).await?;
/// println!("{} sites examined", report.hosts_examined);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    seed: Option<Host>,
) -> Result<CrawlReport, RippleError> {
    let exclusion = ExclusionFilter::with_extra(&config.exclude);
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    let run_seed = seed.as_ref().map(|host| host.as_str().to_string());
    let frontier = initial_frontier(&storage, &exclusion, seed)?;
    let sink = PrologFactLog::open(Path::new(&config.output.facts_path))?;

    let client = build_http_client(&config.user_agent, &config.crawler)?;
    let gate = PolicyGate::new(
        HttpPolicySource::new(client.clone(), &config.crawler.policy_scheme),
        Duration::from_secs(config.crawler.policy_timeout_secs),
    );
    let fetcher = HttpPeerFetcher::new(
        client,
        gate,
        &config.crawler.peers_scheme,
        &config.crawler.peers_path,
        Duration::from_secs(config.crawler.peers_timeout_secs),
    );

    let run_id = storage.create_run(config_hash, run_seed.as_deref())?;
    let mut engine = CrawlEngine::new(frontier, fetcher, exclusion, storage, sink);
    let result = engine.run().await;
    let report = engine.report().clone();
    let (_, mut storage, _) = engine.into_parts();

    match result {
        Ok(report) => {
            storage.finish_run(
                run_id,
                RunStatus::Completed,
                report.hosts_examined,
                report.edges_written,
            )?;
            Ok(report)
        }
        Err(e) => {
            if let Err(store_err) = storage.finish_run(
                run_id,
                RunStatus::Failed,
                report.hosts_examined,
                report.edges_written,
            ) {
                tracing::warn!("Could not mark run {} as failed: {}", run_id, store_err);
            }
            Err(e)
        }
    }
}
