//! Spoder main entry point
//!
//! This is the command-line interface for the Spoder crawler.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use spoder::config::{read_config, Config};
use spoder::crawler::{crawl, HttpTransport, ShutdownOutcome};
use spoder::extract::ArtifactStore;
use spoder::output::{write_report, CrawlReport};
use spoder::ConfigResult;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit code for command-line usage errors (BSD `EX_USAGE`)
const EX_USAGE: i32 = 64;

/// Spoder: a recursive link, email and phone number crawler
///
/// Spoder fetches the seed page, collects links, email addresses and phone
/// numbers from its markup and, with --recursive, follows every new link.
#[derive(Parser, Debug)]
#[command(name = "spoder")]
#[command(version = "1.0.0")]
#[command(about = "A recursive link, email and phone number crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (http:// or https://)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file; flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Append the report to this file instead of printing it
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of worker tasks [default: 2 x available cores]
    #[arg(short, long)]
    threads: Option<usize>,

    /// Follow newly found links
    #[arg(short, long)]
    recursive: bool,

    /// Recursion depth limit, requires --recursive
    #[arg(short, long)]
    depth: Option<u32>,

    /// Cookies sent with every request, separated by ';'
    #[arg(long, value_name = "COOKIES")]
    cookies: Option<String>,

    /// Custom regular expression for links in text
    #[arg(long, value_name = "REGEX")]
    link: Option<String>,

    /// Custom regular expression for href attribute values
    #[arg(long, value_name = "REGEX")]
    href: Option<String>,

    /// Custom regular expression for email addresses
    #[arg(long, value_name = "REGEX")]
    email: Option<String>,

    /// Custom regular expression for telephone numbers
    #[arg(long, value_name = "REGEX")]
    telephone: Option<String>,

    /// Validate arguments and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(EX_USAGE);
        }
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(EX_USAGE);
        }
    };

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spoder=info,warn"),
            1 => EnvFilter::new("spoder=debug,info"),
            2 => EnvFilter::new("spoder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the optional config file, applies flags on top and validates
fn build_config(cli: &Cli) -> ConfigResult<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)?
        }
        None => Config::default(),
    };

    apply_flags(cli, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_flags(cli: &Cli, config: &mut Config) {
    if let Some(url) = &cli.url {
        config.crawler.seed = Some(url.clone());
    }
    if let Some(threads) = cli.threads {
        config.crawler.threads = threads;
    }
    if cli.recursive {
        config.crawler.recursive = true;
    }
    if let Some(depth) = cli.depth {
        config.crawler.depth = Some(depth);
    }
    if let Some(cookies) = &cli.cookies {
        config.transport.cookies = Some(cookies.clone());
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.clone());
    }

    let patterns = &mut config.patterns;
    for (flag, slot) in [
        (&cli.link, &mut patterns.link),
        (&cli.href, &mut patterns.href),
        (&cli.email, &mut patterns.email),
        (&cli.telephone, &mut patterns.telephone),
    ] {
        if let Some(pattern) = flag {
            *slot = Some(pattern.clone());
        }
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_dry_run(config: &Config) {
    println!("=== Spoder Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed: {}",
        config.crawler.seed.as_deref().unwrap_or_default()
    );
    println!("  Workers: {}", config.crawler.threads);
    println!("  Depth: {}", config.depth());

    println!("\nTransport:");
    println!("  User agent: {}", config.transport.user_agent);
    println!("  Connect timeout: {}ms", config.transport.connect_timeout_ms);
    println!(
        "  Cookies: {}",
        config.transport.cookies.as_deref().unwrap_or("none")
    );

    println!("\nOutput:");
    match &config.output.path {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  stdout"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.transport).context("Failed to build HTTP client")?;
    let store = Arc::new(ArtifactStore::new());

    let summary = crawl(&config, Arc::new(transport), Arc::clone(&store), interrupted()).await?;

    let report = CrawlReport::new(&store, summary);
    let destination = config.output.path.as_deref();
    write_report(&report, destination).with_context(|| match destination {
        Some(path) => format!("Failed to write report to {}", path.display()),
        None => "Failed to write report".to_string(),
    })?;

    if summary.outcome == ShutdownOutcome::TimedOut {
        tracing::error!("Workers still running after shutdown, exiting");
        std::process::exit(0);
    }

    Ok(())
}

/// Resolves on the first Ctrl-C
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("Interrupted, shutting down..."),
        Err(e) => {
            tracing::error!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
