//! Peer-Ripple main entry point
//!
//! This is the command-line interface for the Peer-Ripple federation mapper.

use anyhow::Context;
use clap::Parser;
use peer_ripple::config::{load_config_with_hash, Config};
use peer_ripple::crawler::run_crawl;
use peer_ripple::{ExclusionFilter, Host};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Peer-Ripple: a polite federation graph mapper
///
/// Peer-Ripple starts from one server, asks it for the peers it federates
/// with, and keeps asking every newly discovered server until no unknown
/// servers remain. Each discovered edge is appended to a Prolog fact file.
/// Progress is checkpointed after every server, so an interrupted crawl
/// resumes where it stopped when run again without a seed.
#[derive(Parser, Debug)]
#[command(name = "peer-ripple")]
#[command(version)]
#[command(about = "A polite federation graph mapper", long_about = None)]
struct Cli {
    /// Host to start a fresh crawl from; resumes the saved crawl when omitted
    #[arg(value_name = "SEED")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the checkpoint and fact log and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }
    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let seed = match cli.seed.as_deref() {
        Some(raw) => Some(Host::parse(raw).with_context(|| format!("Invalid seed host: {raw:?}"))?),
        None => None,
    };

    if cli.dry_run {
        handle_dry_run(&config, seed.as_ref());
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, seed).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("peer_ripple=info,warn"),
            1 => EnvFilter::new("peer_ripple=debug,info"),
            2 => EnvFilter::new("peer_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration and the starting point
fn handle_dry_run(config: &Config, seed: Option<&Host>) {
    println!("=== Peer-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Robots policy: {}://<host>/robots.txt (budget {}s)",
        config.crawler.policy_scheme, config.crawler.policy_timeout_secs
    );
    println!(
        "  Peer list: {}://<host>{} (timeout {}s)",
        config.crawler.peers_scheme, config.crawler.peers_path, config.crawler.peers_timeout_secs
    );
    println!(
        "  Connect timeout: {}s",
        config.crawler.connect_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Checkpoint database: {}", config.output.database_path);
    println!("  Fact log: {}", config.output.facts_path);

    let exclusion = ExclusionFilter::with_extra(&config.exclude);
    println!("\nExcluded Suffixes ({}):", exclusion.suffixes().len());
    for suffix in exclusion.suffixes() {
        println!("  - {}", suffix);
    }

    println!("\n✓ Configuration is valid");
    match seed {
        Some(seed) if exclusion.is_excluded_host(seed) => {
            println!("✓ Seed {} is excluded; a crawl would record nothing", seed)
        }
        Some(seed) => println!("✓ Would start a fresh crawl from {}", seed),
        None => println!(
            "✓ Would resume from the checkpoint in {}",
            config.output.database_path
        ),
    }
}

/// Handles the --stats mode: shows statistics from the checkpoint and fact log
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use peer_ripple::output::{load_statistics, print_statistics};
    use peer_ripple::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}", config.output.database_path);
    println!("Fact log: {}\n", config.output.facts_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open checkpoint database")?;
    let stats = load_statistics(&storage, Path::new(&config.output.facts_path))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, seed: Option<Host>) -> anyhow::Result<()> {
    match run_crawl(config, config_hash, seed).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} sites examined, {} excluded, {} failed, {} facts written",
                report.hosts_examined,
                report.hosts_excluded,
                report.hosts_failed,
                report.edges_written
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
