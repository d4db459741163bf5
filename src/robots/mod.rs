//! Robots.txt handling module
//!
//! This module fetches a site's robots.txt, exposes its `Sitemap:` directives
//! to sitemap discovery and, when enabled, its Allow/Disallow rules to the
//! crawl loop.

mod parser;

pub use parser::ParsedRobots;

use crate::crawler::{FetchResult, Fetcher};
use crate::url::origin_of;
use tracing::debug;
use url::Url;

/// Fetches `{origin}/robots.txt` for the site `base` belongs to
///
/// # Returns
///
/// * `Some(String)` - The file content (HTTP 200)
/// * `None` - Any other status or a network failure
pub async fn fetch_robots_txt(fetcher: &Fetcher, base: &Url) -> Option<String> {
    let robots_url = format!("{}/robots.txt", origin_of(base)?);

    match fetcher.fetch_robots(&robots_url).await {
        FetchResult::Success {
            status_code: 200,
            body,
            ..
        } => Some(body),
        FetchResult::Success { status_code, .. } => {
            debug!("No robots.txt at {} (HTTP {})", robots_url, status_code);
            None
        }
        FetchResult::Failed { error, .. } => {
            debug!("Failed to fetch {}: {}", robots_url, error);
            None
        }
    }
}

/// Loads the robots.txt rules for a site
///
/// A missing or unreachable robots.txt allows everything.
pub async fn load_robots(fetcher: &Fetcher, base: &Url) -> ParsedRobots {
    match fetch_robots_txt(fetcher, base).await {
        Some(content) => ParsedRobots::from_content(&content),
        None => ParsedRobots::allow_all(),
    }
}

/// Sitemap URLs advertised by a site's robots.txt
///
/// Each `Sitemap:` value is resolved against `base_url`; values that cannot
/// be resolved are discarded.
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary
/// * `base_url` - Any URL on the site
///
/// # Returns
///
/// Absolute sitemap URLs in file order, empty when robots.txt is unavailable
pub async fn robots_sitemaps(fetcher: &Fetcher, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    match fetch_robots_txt(fetcher, &base).await {
        Some(content) => resolve_sitemaps(&ParsedRobots::from_content(&content), &base),
        None => Vec::new(),
    }
}

fn resolve_sitemaps(robots: &ParsedRobots, base: &Url) -> Vec<String> {
    robots
        .sitemaps()
        .iter()
        .filter_map(|value| base.join(value).ok())
        .map(|url| url.to_string())
        .collect()
}

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &str, user_agent: &str) -> bool {
    robots.is_allowed(url, user_agent)
}
