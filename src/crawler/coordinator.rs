//! Crawl coordinator
//!
//! The coordinator owns one site's crawl:
//! - Seeds the persistent queue with the homepage, the start URL and
//!   sitemap-discovered URLs
//! - Pulls batches from the queue and fetches them through the scheduler
//! - Queues the filtered links of every fetched page
//! - Stops at the page budget or when the queue runs dry

use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{lock_storage, page};
use crate::robots::{load_robots, ParsedRobots};
use crate::sitemap::{discover_urls_from_sitemaps, DiscoveryOptions};
use crate::storage::{CrawlTarget, PageRecord, Storage};
use crate::url::{extract_domain, homepage_url, normalize_url, should_crawl, FilterRules};
use crate::{CrawlerError, Result, UrlError};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Options for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum number of successful pages returned
    pub max_pages: usize,
    /// Maximum fetches in flight
    pub parallel: usize,
    /// Delay before each fetch
    pub crawl_delay: Duration,
    /// Apply the denylist to discovered links; scope checks always apply
    pub filter_urls: bool,
    /// Seed the queue from sitemap discovery
    pub use_sitemaps: bool,
    /// Skip URLs disallowed by robots.txt
    pub respect_robots: bool,
    pub discovery: DiscoveryOptions,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 100,
            parallel: 5,
            crawl_delay: Duration::from_millis(1000),
            filter_urls: true,
            use_sitemaps: true,
            respect_robots: false,
            discovery: DiscoveryOptions::default(),
        }
    }
}

/// A fetched page together with the links worth queueing
struct Visit {
    page: PageRecord,
    links: Vec<String>,
}

/// Main crawl coordinator
pub struct Coordinator<S: Storage> {
    /// HTTP boundary
    fetcher: Fetcher,

    /// Page cache and discovery queue
    storage: Arc<Mutex<S>>,

    /// Denylist for queued links
    rules: FilterRules,

    options: CrawlOptions,

    /// Concurrency limit and politeness delay
    scheduler: Scheduler,

    /// Product token matched against robots.txt user-agent groups
    robots_agent: String,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a new coordinator
    ///
    /// When `options.filter_urls` is off, `rules` is replaced by
    /// `FilterRules::empty()` so only scheme and host scoping remain.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - HTTP boundary
    /// * `storage` - Shared page cache and discovery queue
    /// * `rules` - Denylist for discovered links
    /// * `options` - Crawl options
    pub fn new(
        fetcher: Fetcher,
        storage: Arc<Mutex<S>>,
        rules: FilterRules,
        options: CrawlOptions,
    ) -> Self {
        let rules = if options.filter_urls {
            rules
        } else {
            FilterRules::empty()
        };
        let scheduler = Scheduler::new(options.parallel, options.crawl_delay);

        Self {
            fetcher,
            storage,
            rules,
            options,
            scheduler,
            robots_agent: "*".to_string(),
        }
    }

    /// Sets the product token used for robots.txt matching
    pub fn with_robots_agent(mut self, agent: impl Into<String>) -> Self {
        self.robots_agent = agent.into();
        self
    }

    /// Shared storage handle
    pub fn storage(&self) -> &Arc<Mutex<S>> {
        &self.storage
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Fetches one page through the cache
    ///
    /// See [`page::crawl_url`].
    pub async fn crawl_url(&self, url: &str) -> Result<Option<PageRecord>> {
        page::crawl_url(&self.fetcher, &self.storage, url).await
    }

    /// Crawls a site starting from `start_url`
    ///
    /// # Flow
    ///
    /// 1. Successful pages already cached for the domain count toward the
    ///    budget. If they fill it and include the homepage, they are returned
    ///    without any network activity.
    /// 2. The homepage and the start URL are queued, plus sitemap URLs when
    ///    enabled
    /// 3. Batches of `2 * parallel` uncrawled URLs are pulled (homepage first
    ///    on the first pull), fetched through the scheduler and marked crawled.
    ///    Links of fetched HTML pages that pass the filter are queued.
    /// 4. The loop ends at `max_pages` successful pages or when the queue
    ///    yields nothing new
    ///
    /// Per-page failures are logged and never abort the run.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageRecord>)` - Successful records, at most `max_pages`
    /// * `Err(CrawlerError)` - The start URL is invalid or the queue could not be read
    pub async fn crawl_pages(&self, start_url: &str) -> Result<Vec<PageRecord>> {
        let start = normalize_url(start_url);
        let base = Url::parse(&start)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()).into());
        }
        let domain = extract_domain(&base).ok_or(UrlError::MissingDomain)?;
        let homepage = homepage_url(&base).ok_or(UrlError::MissingDomain)?;
        let max_pages = self.options.max_pages;

        tracing::info!("Starting crawl of {} (max {} pages)", domain, max_pages);

        let mut results = lock_storage(&self.storage)?.get_crawled_pages_for_domain(&domain)?;
        if results.len() >= max_pages && results.iter().any(|p| p.url == homepage) {
            tracing::info!(
                "{} already has {} cached pages, skipping network",
                domain,
                results.len()
            );
            results.truncate(max_pages);
            return Ok(results);
        }
        if !results.is_empty() {
            tracing::info!("Resuming {} with {} cached pages", domain, results.len());
        }

        self.enqueue(
            [homepage.as_str(), start.as_str()]
                .into_iter()
                .map(|url| CrawlTarget::new(url, &domain, None)),
        );

        if self.options.use_sitemaps {
            let discovered = discover_urls_from_sitemaps(
                &self.fetcher,
                &start,
                &self.options.discovery,
                &self.rules,
            )
            .await;
            self.enqueue(
                discovered
                    .iter()
                    .map(|d| CrawlTarget::new(&d.url, &domain, Some(d.source.as_str()))),
            );
        }

        let robots = if self.options.respect_robots {
            load_robots(&self.fetcher, &base).await
        } else {
            ParsedRobots::allow_all()
        };

        let mut added: HashSet<String> = results.iter().map(|p| p.url.clone()).collect();
        let mut dispatched: HashSet<String> = HashSet::new();
        let batch_size = self.options.parallel.max(1) * 2;
        let mut first_batch = true;

        while results.len() < max_pages {
            let pulled =
                lock_storage(&self.storage)?.get_uncrawled_urls(&domain, batch_size, first_batch)?;
            first_batch = false;

            let batch: Vec<String> = pulled
                .into_iter()
                .filter(|url| dispatched.insert(url.clone()))
                .collect();
            if batch.is_empty() {
                tracing::debug!("Queue exhausted for {}", domain);
                break;
            }

            tracing::debug!("Dispatching batch of {} URLs", batch.len());
            let visits = join_all(
                batch
                    .iter()
                    .map(|url| self.visit(url, &domain, &robots)),
            )
            .await;

            for visit in visits.into_iter().flatten() {
                let source = visit.page.url.clone();
                self.enqueue(
                    visit
                        .links
                        .iter()
                        .map(|link| CrawlTarget::new(link, &domain, Some(&source))),
                );
                if added.insert(visit.page.url.clone()) {
                    results.push(visit.page);
                }
            }

            tracing::info!("{}: {}/{} pages", domain, results.len().min(max_pages), max_pages);
        }

        results.truncate(max_pages);
        tracing::info!("Finished crawl of {}: {} pages", domain, results.len());
        Ok(results)
    }

    /// Fetches one queued URL and marks it crawled
    ///
    /// Returns `None` for failures and robots.txt exclusions, after logging them.
    async fn visit(&self, url: &str, domain: &str, robots: &ParsedRobots) -> Option<Visit> {
        if !robots.is_allowed(url, &self.robots_agent) {
            tracing::info!("URL {} disallowed by robots.txt", url);
            self.mark_crawled(url, domain);
            return None;
        }

        let Some(result) = self.scheduler.run(self.crawl_url(url)).await else {
            tracing::error!("Fetch slots closed, skipping {}", url);
            return None;
        };
        self.mark_crawled(url, domain);

        let page = match result {
            Ok(Some(page)) => page,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Error processing {}: {}", url, e);
                return None;
            }
        };

        if let Some(error) = &page.error {
            tracing::warn!("Failed to crawl {}: {}", url, error);
            return None;
        }

        let links = page
            .metadata
            .iter()
            .flat_map(|metadata| metadata.links.iter())
            .filter(|link| should_crawl(link, domain, &self.rules))
            .cloned()
            .collect();

        Some(Visit { page, links })
    }

    fn mark_crawled(&self, url: &str, domain: &str) {
        let result = lock_storage(&self.storage).and_then(|mut storage| {
            storage
                .mark_url_as_crawled(url, domain)
                .map_err(CrawlerError::from)
        });
        if let Err(e) = result {
            tracing::warn!("Failed to mark {} as crawled: {}", url, e);
        }
    }

    /// Queues targets, logging storage failures
    fn enqueue(&self, targets: impl IntoIterator<Item = CrawlTarget>) {
        let mut storage = match lock_storage(&self.storage) {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!("Cannot queue URLs: {}", e);
                return;
            }
        };

        let mut queued = 0;
        for target in targets {
            match storage.add_discovered_url(&target) {
                Ok(true) => queued += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Failed to queue {}: {}", target.url, e),
            }
        }
        if queued > 0 {
            tracing::debug!("Queued {} new URLs", queued);
        }
    }
}
