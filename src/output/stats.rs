//! Statistics generation from the checkpoint database and fact log

use crate::output::prolog::count_facts;
use crate::storage::{RunRecord, RunStore, SqliteStorage};
use crate::RippleError;
use std::path::Path;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Hosts already examined
    pub visited: u64,

    /// Hosts waiting to be examined
    pub pending: u64,

    /// Facts in the fact log (across all runs)
    pub facts: u64,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

impl CrawlStatistics {
    /// Share of known hosts that have been examined, as a percentage
    pub fn progress(&self) -> f64 {
        let known = self.visited + self.pending;
        if known == 0 {
            return 0.0;
        }
        (self.visited as f64 / known as f64) * 100.0
    }
}

/// Loads statistics from storage and the fact log
pub fn load_statistics(
    storage: &SqliteStorage,
    facts_path: &Path,
) -> Result<CrawlStatistics, RippleError> {
    let (visited, pending) = storage.checkpoint_counts()?;
    let facts = count_facts(facts_path)?;
    let latest_run = storage.get_latest_run()?;

    Ok(CrawlStatistics {
        visited,
        pending,
        facts,
        latest_run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Checkpoint:");
    println!("  Sites seen: {}", stats.visited);
    println!("  Sites remaining: {}", stats.pending);
    println!("  Progress: {:.1}%", stats.progress());
    println!();

    println!("Fact log:");
    println!("  Peer facts: {}", stats.facts);
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest run (#{}):", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            match &run.seed {
                Some(seed) => println!("  Seed: {}", seed),
                None => println!("  Seed: (resumed)"),
            }
            println!("  Sites examined: {}", run.hosts_examined);
            println!("  Facts written: {}", run.edges_written);
        }
        None => println!("No crawl runs recorded yet."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use crate::state::Frontier;
    use crate::storage::FrontierStore;
    use std::collections::BTreeSet;

    #[test]
    fn test_progress() {
        let stats = CrawlStatistics {
            visited: 3,
            pending: 1,
            facts: 10,
            latest_run: None,
        };
        assert!((stats.progress() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_progress_empty() {
        let stats = CrawlStatistics {
            visited: 0,
            pending: 0,
            facts: 0,
            latest_run: None,
        };
        assert_eq!(stats.progress(), 0.0);
    }

    #[test]
    fn test_load_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = SqliteStorage::new(&dir.path().join("peers.db")).unwrap();
        let facts_path = dir.path().join("peers.pl");
        std::fs::write(&facts_path, "peer('a.example','b.example').\n").unwrap();

        let visited: BTreeSet<Host> = [Host::parse("a.example").unwrap()].into_iter().collect();
        let pending: BTreeSet<Host> = [Host::parse("b.example").unwrap()].into_iter().collect();
        storage.save(&Frontier::from_parts(visited, pending)).unwrap();
        storage.create_run("hash", Some("a.example")).unwrap();

        let stats = load_statistics(&storage, &facts_path).unwrap();
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.facts, 1);
        assert_eq!(stats.latest_run.unwrap().seed.as_deref(), Some("a.example"));
    }
}
