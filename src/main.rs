//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirrorer.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use site_mirror::config::{load_config_with_hash, validate, MirrorConfig};
use site_mirror::output::{print_failures, print_statistics};
use site_mirror::Mirror;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a same-host website mirrorer
///
/// Site-Mirror fetches every resource on the seed's host that is reachable
/// from the seed URL, rewrites links so the copy can be browsed offline,
/// and writes everything under the output directory.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a website for offline browsing", long_about = None)]
struct Cli {
    /// Seed URL; https:// is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory (overrides the config file)
    #[arg(value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum simultaneous fetches (overrides the config file)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let mirror = Mirror::new(config, &cli.url)
        .with_context(|| format!("cannot mirror {}", cli.url))?;
    let report = mirror.run().await.context("mirror run failed")?;

    if !cli.quiet {
        print_statistics(&report.stats);
    }
    print_failures(&report.failures);

    Ok(())
}

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<MirrorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => MirrorConfig::default(),
    };

    if let Some(output) = &cli.output {
        config.mirror.output_dir = output.to_string_lossy().into_owned();
    }
    if let Some(concurrency) = cli.concurrency {
        config.mirror.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.mirror.request_timeout_secs = timeout;
    }

    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
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
