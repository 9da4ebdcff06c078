//! kinotop - ranks the films currently showing by rating.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
use kinotop_cache::PageCache;
use kinotop_scrape::afisha::AfishaClient;
use kinotop_scrape::fetch::PageFetcher;
use kinotop_scrape::kinopoisk::KinopoiskClient;
use kinotop_scrape::top::Ranker;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/cache directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Override the schedule page URL.
    #[arg(long, global = true, hide = true)]
    afisha_base_url: Option<Url>,

    /// Override the detail search URL.
    #[arg(long, global = true, hide = true)]
    kinopoisk_base_url: Option<Url>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Rank the films currently showing by rating.
    Top(TopArgs),
    /// Page cache operations.
    Cache(CacheCommand),
}

/// Arguments for the `top` subcommand.
#[derive(clap::Args)]
struct TopArgs {
    /// Number of films to show. Falls back to config `top_count` if omitted.
    #[arg(long)]
    count: Option<usize>,

    /// Print the ranking as JSON to stdout.
    #[arg(long)]
    json: bool,
}

/// Arguments for the `cache` subcommand.
#[derive(clap::Args)]
struct CacheCommand {
    /// Cache subcommand to run.
    #[command(subcommand)]
    command: CacheSubcommands,
}

/// Available cache subcommands.
#[derive(Subcommand)]
enum CacheSubcommands {
    /// Drop all cached pages.
    Clear,
}

/// Loads the config for the given directory override.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Opens the page cache with the configured TTL and capacity.
fn open_cache(config: &AppConfig, dir: Option<&PathBuf>) -> Result<PageCache> {
    let ttl = Duration::from_secs(config.cache.ttl_hours.saturating_mul(3600));

    let mut builder = PageCache::builder()
        .ttl(ttl)
        .capacity(config.cache.capacity);
    if let Some(d) = dir {
        builder = builder.dir(d);
    }
    builder.build().context("failed to open page cache")
}

/// Runs the `top` subcommand.
///
/// # Errors
///
/// Returns an error if the cache or clients fail to build, or the
/// schedule fetch fails.
#[instrument(skip_all)]
async fn run_top(args: &TopArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli.dir.as_ref())?;
    let cache = open_cache(&config, cli.dir.as_ref())?;
    let fetcher = PageFetcher::new(Arc::new(cache)).context("failed to build page fetcher")?;

    let mut schedule = AfishaClient::builder()
        .fetcher(fetcher.clone())
        .min_venue_count(config.scrape.min_venue_count);
    if let Some(url) = cli.afisha_base_url.clone() {
        schedule = schedule.base_url(url);
    }
    let schedule = schedule.build().context("failed to build schedule client")?;

    let mut details = KinopoiskClient::builder().fetcher(fetcher);
    if let Some(url) = cli.kinopoisk_base_url.clone() {
        details = details.base_url(url);
    }
    let details = details.build().context("failed to build detail client")?;

    let count = args.count.unwrap_or(config.scrape.top_count);
    let films = Ranker::new(schedule, details)
        .rank_top_films(count)
        .await
        .context("ranking failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&films).context("failed to serialize ranking")?;
        #[allow(clippy::print_stdout)]
        {
            println!("{json}");
        }
        return Ok(());
    }

    tracing::info!("Rating\tVotes\tVenues\tYear\tTitle");
    for film in &films {
        tracing::info!(
            "{:.1}\t{}\t{}\t{}\t{}",
            film.rating,
            film.rating_count,
            film.venue_count,
            film.year.as_deref().unwrap_or("-"),
            film.title,
        );
    }
    tracing::info!("Total: {} films", films.len());

    Ok(())
}

/// Runs the `cache clear` subcommand.
///
/// # Errors
///
/// Returns an error if the cache fails to open or the delete fails.
#[instrument(skip_all)]
async fn run_cache_clear(cli: &Cli) -> Result<()> {
    let config = load_config(cli.dir.as_ref())?;
    let cache = open_cache(&config, cli.dir.as_ref())?;

    let removed = cache.clear().await.context("failed to clear page cache")?;
    tracing::info!("Page cache cleared: {removed} entries removed");

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so `top --json` leaves stdout machine-readable.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Top(args) => run_top(args, &cli).await,
        Commands::Cache(cache) => match cache.command {
            CacheSubcommands::Clear => run_cache_clear(&cli).await,
        },
    }
}
