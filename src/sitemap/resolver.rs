use crate::crawler::Fetcher;
use crate::robots::robots_sitemaps;
use crate::sitemap::fetch::fetch_sitemap;
use crate::sitemap::parser::SitemapDocument;
use crate::url::{extract_domain, is_homepage, normalize_url, origin_of, should_crawl, FilterRules};
use futures::future::join_all;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Well-known sitemap locations tried on every site
const WELL_KNOWN_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemaps.xml",
    "/sitemap/sitemap.xml",
    "/wp-sitemap.xml",
    "/sitemap/index.xml",
];

/// Entries taken from a single urlset
pub const MAX_URLS_PER_SITEMAP: usize = 1000;

/// Unvisited sitemaps processed per nesting level
pub const MAX_SITEMAPS_PER_LEVEL: usize = 20;

/// Priority assumed for entries without a usable `<priority>`
const DEFAULT_PRIORITY: f64 = 0.5;

/// Limits for sitemap discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Maximum number of URLs returned
    pub max_urls: usize,
    /// Maximum nesting levels followed, counting the candidates as level one
    pub max_depth: usize,
    /// Maximum number of candidate sitemaps
    pub max_sitemaps: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_urls: 1000,
            max_depth: 3,
            max_sitemaps: 50,
        }
    }
}

/// Where a discovered URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlSource {
    Sitemap,
}

impl UrlSource {
    /// Provenance label stored with queued URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
        }
    }
}

/// A page URL found through sitemap discovery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredUrl {
    /// Normalized URL
    pub url: String,
    pub source: UrlSource,
    pub lastmod: Option<String>,
    pub priority: Option<f64>,
    pub changefreq: Option<String>,
}

/// Discovers crawlable page URLs from a site's sitemaps
///
/// # Algorithm
///
/// 1. Candidates: `Sitemap:` entries from robots.txt followed by the
///    well-known locations, deduplicated and capped at `max_sitemaps`
/// 2. Breadth-first walk, one nesting level per step, for at most
///    `max_depth` levels. Each level fetches up to 20 sitemaps not seen before.
///    A urlset contributes its first 1000 entries that pass `rules` for the
///    base domain. An index contributes its children to the next level.
/// 3. Failed or malformed sitemaps are logged and skipped
/// 4. Deduplicate by normalized URL (first wins) and cap at `max_urls`
/// 5. Order: homepage first, then by descending priority (0.5 when missing)
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary
/// * `base_url` - Any URL on the site
/// * `options` - Discovery limits
/// * `rules` - Denylist applied to urlset entries
///
/// # Returns
///
/// The discovered URLs; empty when nothing was found. Never fails.
pub async fn discover_urls_from_sitemaps(
    fetcher: &Fetcher,
    base_url: &str,
    options: &DiscoveryOptions,
    rules: &FilterRules,
) -> Vec<DiscoveredUrl> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            warn!("Cannot discover sitemaps for {}: {}", base_url, e);
            return Vec::new();
        }
    };
    let (Some(domain), Some(origin)) = (extract_domain(&base), origin_of(&base)) else {
        warn!("Cannot discover sitemaps for {}: no host", base_url);
        return Vec::new();
    };

    let mut candidates = robots_sitemaps(fetcher, base_url).await;
    candidates.extend(
        WELL_KNOWN_SITEMAP_PATHS
            .iter()
            .map(|path| format!("{}{}", origin, path)),
    );
    let mut seen = HashSet::new();
    candidates.retain(|url| seen.insert(url.clone()));
    candidates.truncate(options.max_sitemaps);

    debug!("Sitemap candidates for {}: {:?}", domain, candidates);

    let mut visited: HashSet<String> = HashSet::new();
    let mut level = candidates;
    let mut found: Vec<DiscoveredUrl> = Vec::new();

    for depth in 0..options.max_depth {
        let batch: Vec<String> = level
            .into_iter()
            .filter(|url| visited.insert(url.clone()))
            .take(MAX_SITEMAPS_PER_LEVEL)
            .collect();
        if batch.is_empty() {
            break;
        }

        let results = join_all(batch.iter().map(|url| fetch_sitemap(fetcher, url))).await;

        let mut next_level = Vec::new();
        for (url, result) in batch.iter().zip(results) {
            match result {
                Ok(SitemapDocument::UrlSet(entries)) => {
                    debug!("Sitemap {} (level {}): {} entries", url, depth + 1, entries.len());
                    found.extend(
                        entries
                            .into_iter()
                            .take(MAX_URLS_PER_SITEMAP)
                            .filter(|entry| should_crawl(&entry.url, &domain, rules))
                            .map(|entry| DiscoveredUrl {
                                url: normalize_url(&entry.url),
                                source: UrlSource::Sitemap,
                                lastmod: entry.lastmod,
                                priority: entry.priority,
                                changefreq: entry.changefreq,
                            }),
                    );
                }
                Ok(SitemapDocument::Index(children)) => {
                    debug!("Sitemap index {} (level {}): {} children", url, depth + 1, children.len());
                    next_level.extend(
                        children
                            .into_iter()
                            .map(|child| child.url)
                            .filter(|child| !visited.contains(child)),
                    );
                }
                Ok(SitemapDocument::Unknown) => {
                    debug!("Ignoring {}: not a sitemap document", url);
                }
                Err(e) => {
                    warn!("Skipping sitemap: {}", e);
                }
            }
        }

        level = next_level;
    }

    let mut seen = HashSet::new();
    found.retain(|entry| seen.insert(entry.url.clone()));
    found.truncate(options.max_urls);
    sort_discovered(&mut found, &origin);

    info!("Discovered {} URLs from sitemaps for {}", found.len(), domain);
    found
}

/// Stable sort: homepage first, then descending priority
fn sort_discovered(urls: &mut [DiscoveredUrl], origin: &str) {
    urls.sort_by(|a, b| {
        let a_home = is_homepage(&a.url, origin);
        let b_home = is_homepage(&b.url, origin);
        b_home.cmp(&a_home).then_with(|| {
            let a_priority = a.priority.unwrap_or(DEFAULT_PRIORITY);
            let b_priority = b.priority.unwrap_or(DEFAULT_PRIORITY);
            b_priority.partial_cmp(&a_priority).unwrap_or(Ordering::Equal)
        })
    });
}
