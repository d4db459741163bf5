//! Site Crawler main entry point
//!
//! This is the command-line interface for sitemap discovery and site crawling.

use anyhow::Context;
use clap::Parser;
use site_crawler::config::{load_config_with_hash, Config};
use site_crawler::crawler::{Coordinator, Fetcher};
use site_crawler::output::{load_statistics, print_statistics, RunSummary};
use site_crawler::storage::{open_storage, SqliteStorage, Storage};
use site_crawler::{discover_urls_from_sitemaps, domain_of, normalize_url};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Site Crawler: sitemap discovery and polite site crawling
///
/// Discovers a site's pages from robots.txt and its sitemaps, then crawls
/// them within a page budget, caching every page in a local database.
#[derive(Parser, Debug)]
#[command(name = "site-crawler")]
#[command(version)]
#[command(about = "Sitemap discovery and polite site crawling", long_about = None)]
struct Cli {
    /// Site to crawl
    #[arg(long, value_name = "URL", required_unless_present = "companies")]
    url: Option<String>,

    /// File with one site per line (`#` starts a comment; CSV rows allowed)
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    companies: Option<PathBuf>,

    /// Crawl passes per site
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Maximum concurrent fetches (overrides the config file)
    #[arg(long)]
    parallel: Option<usize>,

    /// Page budget per site (overrides the config file)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Apply the URL denylist; `false` keeps only scheme and host scoping
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    filter_urls: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Drop cached pages and queued URLs of each site before crawling
    #[arg(long)]
    fresh: bool,

    /// Discover sitemap URLs and print them without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };
    if let Some(parallel) = cli.parallel {
        config.crawler.parallel = parallel.max(1);
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages.max(1);
    }

    let sites = match (&cli.url, &cli.companies) {
        (Some(url), _) => vec![url.clone()],
        (None, Some(path)) => read_companies(path)?,
        (None, None) => Vec::new(),
    };
    if sites.is_empty() {
        tracing::warn!("No sites to crawl");
        return Ok(());
    }

    if cli.dry_run {
        handle_dry_run(&config, &sites).await?;
    } else if cli.stats {
        handle_stats(&config, &sites)?;
    } else {
        handle_crawl(&config, &cli, &sites).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_crawler=info,warn"),
            1 => EnvFilter::new("site_crawler=debug,info"),
            2 => EnvFilter::new("site_crawler=trace,debug"),
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

/// Reads the sites listed in a companies file
fn read_companies(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read companies file {}", path.display()))?;
    let sites = parse_companies(&content);
    tracing::info!("Loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Extracts one site URL per line
///
/// Blank lines and lines starting with `#` are skipped. For CSV rows the
/// first URL-looking field is used; bare domains get an `https://` scheme.
fn parse_companies(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split(',')
                .map(|field| field.trim().trim_matches('"'))
                .find(|field| looks_like_url(field))
        })
        .map(|field| {
            if field.starts_with("http://") || field.starts_with("https://") {
                field.to_string()
            } else {
                format!("https://{}", field)
            }
        })
        .collect()
}

fn looks_like_url(field: &str) -> bool {
    if field.starts_with("http://") || field.starts_with("https://") {
        return true;
    }
    !field.contains(char::is_whitespace)
        && !field.contains('@')
        && field
            .split('/')
            .next()
            .is_some_and(|host| host.contains('.') && !host.starts_with('.') && !host.ends_with('.'))
}

/// Handles the --dry-run mode: prints sitemap-discovered URLs per site
async fn handle_dry_run(config: &Config, sites: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(config)?;
    let rules = config.filter_rules()?;
    let options = config.discovery_options();

    for site in sites {
        println!("=== Sitemap Discovery: {} ===\n", site);
        let discovered = discover_urls_from_sitemaps(&fetcher, site, &options, &rules).await;
        for entry in &discovered {
            match entry.priority {
                Some(priority) => println!("  {} (priority {:.1})", entry.url, priority),
                None => println!("  {}", entry.url),
            }
        }
        println!("\n✓ {} URLs discovered\n", discovered.len());
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config, sites: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;

    for site in sites {
        let Some(domain) = domain_of(&normalize_url(site)) else {
            tracing::warn!("Skipping invalid site URL: {}", site);
            continue;
        };
        let stats = load_statistics(&storage, &domain)?;
        print_statistics(&stats);
        println!();
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    cli: &Cli,
    sites: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let storage: Arc<Mutex<SqliteStorage>> = Arc::new(Mutex::new(open_storage(Path::new(
        &config.output.database_path,
    ))?));
    let fetcher = Fetcher::new(config)?;
    let rules = config.filter_rules()?;

    let mut options = config.crawl_options();
    options.filter_urls = cli.filter_urls;

    tracing::info!(
        "Crawling {} sites (max {} pages, {} parallel, {} runs)",
        sites.len(),
        options.max_pages,
        options.parallel,
        cli.runs
    );

    let coordinator = Coordinator::new(fetcher, storage.clone(), rules, options)
        .with_robots_agent(config.user_agent.crawler_name.clone());

    let mut failed = 0;
    for site in sites {
        let Some(domain) = domain_of(&normalize_url(site)) else {
            tracing::warn!("Skipping invalid site URL: {}", site);
            failed += 1;
            continue;
        };

        if cli.fresh {
            tracing::info!("Clearing cached state for {}", domain);
            let cleared = storage
                .lock()
                .map_err(|_| "storage mutex poisoned")?
                .clear_domain(&domain);
            if let Err(e) = cleared {
                tracing::error!("Failed to clear {}: {}", domain, e);
            }
        }

        for run in 1..=cli.runs.max(1) {
            tracing::info!("Run {}/{} for {}", run, cli.runs.max(1), site);
            match coordinator.crawl_pages(site).await {
                Ok(pages) => RunSummary::from_pages(&domain, &pages).print(),
                Err(e) => {
                    tracing::error!("Crawl of {} failed: {}", site, e);
                    failed += 1;
                    break;
                }
            }
        }
    }

    if failed > 0 {
        tracing::warn!("{} of {} sites failed", failed, sites.len());
    } else {
        tracing::info!("Crawl completed successfully");
    }
    Ok(())
}
