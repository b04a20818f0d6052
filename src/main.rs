//! Listing-Harvester main entry point
//!
//! This is the command-line interface for the listing media harvester.

use anyhow::{Context, Result};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::crawler::{
    build_http_client, HttpFetcher, HttpSession, PageCrawler, PolitenessPolicy, PostExtractor,
    SessionOptions,
};
use listing_harvester::download::{DownloadOrchestrator, HttpTransfer};
use listing_harvester::media::{build_default_registry, FilenameDeriver};
use listing_harvester::output::{load_statistics, print_statistics};
use listing_harvester::storage::SqliteStorage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Listing-Harvester: downloads the media linked from a paginated listing
///
/// Crawls the listing starting at URL, resolves each post's media and
/// downloads it into DIRECTORY. A database in DIRECTORY remembers what was
/// already downloaded, so running again only fetches new posts.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version)]
#[command(about = "Downloads the media linked from a paginated listing", long_about = None)]
struct Cli {
    /// Display download progress and statistics (-v); repeat for more log detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Maximum number of listing pages to crawl (0 = until the last page)
    #[arg(short, long, value_name = "PAGES", default_value_t = 0)]
    pages: u32,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// First listing page to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Destination directory for media and the download database
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let start_url =
        Url::parse(&cli.url).with_context(|| format!("Invalid listing URL: {}", cli.url))?;

    run(config, &cli, start_url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("listing_harvester=info,warn"),
        1 => EnvFilter::new("listing_harvester=debug,info"),
        2 => EnvFilter::new("listing_harvester=trace,debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Crawls the listing and downloads everything not downloaded before
async fn run(config: Config, cli: &Cli, start_url: Url) -> Result<()> {
    // Store failures are fatal and must surface before any crawling
    let mut storage = SqliteStorage::open_destination(&cli.directory).with_context(|| {
        format!(
            "Failed to open the download database in {}",
            cli.directory.display()
        )
    })?;

    let request_timeout = Duration::from_secs(config.crawler.request_timeout_secs);
    let client = build_http_client(&config.user_agent, request_timeout, false)
        .context("Failed to build HTTP client")?;

    let filenames = FilenameDeriver::new(config.media.extensions.clone());
    let registry = build_default_registry(
        &config.media.hosting_domains,
        filenames.clone(),
        config.resolver.unknown_domain,
        Arc::new(HttpFetcher::new(client.clone())),
    );
    tracing::debug!(
        "Hosting domains: {}",
        registry.tags().collect::<Vec<_>>().join(", ")
    );

    let crawler = PageCrawler::new(
        PostExtractor::new(Arc::new(registry), filenames),
        PolitenessPolicy::from_config(&config),
    );

    let session = HttpSession::open(
        &config.user_agent,
        SessionOptions::from_config(&config, &cli.directory),
    )
    .context("Failed to open render session")?;

    let records = crawler
        .crawl(session, start_url.as_str(), cli.pages)
        .await
        .context("Crawl failed")?;

    let orchestrator =
        DownloadOrchestrator::new(HttpTransfer::new(client), cli.directory.clone(), cli.verbose > 0);
    let summary = orchestrator
        .run(&mut storage, records)
        .await
        .context("Download failed")?;

    if cli.verbose > 0 {
        let stats = load_statistics(&storage).context("Failed to load statistics")?;
        print_statistics(&stats, Some(&summary));
    }

    Ok(())
}
