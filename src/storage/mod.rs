//! Storage module for persisting crawl data
//!
//! This module holds the page cache and the persistent discovery queue:
//! - The `Storage` trait the crawler is written against
//! - An SQLite backend for real runs
//! - An in-memory backend for tests and one-off runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::PageMetadata;
use crate::CrawlerError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Opens (or creates) the SQLite database at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlerError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlerError> {
    SqliteStorage::new(path)
}

/// The outcome of one fetch attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Normalized URL, the cache key
    pub url: String,
    pub domain: String,
    /// Body of a successful HTML response
    pub html: Option<String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    /// Set when the fetch failed (network error, timeout, 5xx)
    pub error: Option<String>,
    pub metadata: Option<PageMetadata>,
    /// RFC 3339 timestamp
    pub fetched_at: String,
}

impl PageRecord {
    /// True when the fetch completed (any status below 500)
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A URL waiting in the discovery queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Normalized URL
    pub url: String,
    pub domain: String,
    /// Page the URL was found on, or a label such as "sitemap"
    pub discovered_from: Option<String>,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, domain: impl Into<String>, discovered_from: Option<&str>) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
            discovered_from: discovered_from.map(str::to_string),
        }
    }
}

/// Queue and cache counts for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainStats {
    pub domain: String,
    /// URLs in the discovery queue
    pub discovered: u64,
    /// Queue entries marked crawled
    pub crawled: u64,
    /// Records in the page cache
    pub cached_pages: u64,
    /// Cached records with an error
    pub failed_pages: u64,
}

/// True for a site root: path `/` and no query
pub(crate) fn is_root_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.path() == "/" && u.query().is_none())
        .unwrap_or(false)
}

/// Applies homepage priority and the batch limit to URLs in discovery order
///
/// Only the first `limit` URLs are copied out of the frontier.
pub(crate) fn take_batch<'a, I>(urls: I, limit: usize, prioritize_homepage: bool) -> Vec<String>
where
    I: Iterator<Item = &'a str> + Clone,
{
    let home = if prioritize_homepage {
        urls.clone().find(|url| is_root_url(url))
    } else {
        None
    };

    home.into_iter()
        .chain(urls.filter(|url| Some(*url) != home))
        .take(limit)
        .map(str::to_string)
        .collect()
}
