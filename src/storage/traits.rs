//! Storage traits and error types
//!
//! This module defines the trait interface for the page cache and discovery
//! queue, and the associated error types.

use crate::storage::{CrawlTarget, DomainStats, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A backend holds two collections keyed by normalized URL:
/// - the page cache, one `PageRecord` per URL, overwritten on re-crawl
/// - the discovery queue, one entry per URL with a crawled flag
pub trait Storage {
    // ===== Page Cache =====

    /// Gets the cached record for a URL
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized URL
    ///
    /// # Returns
    ///
    /// The cached record, successful or not, if the URL was ever fetched
    fn get_cached_page(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Inserts or replaces the cached record for `page.url`
    fn save_cached_page(&mut self, page: &PageRecord) -> StorageResult<()>;

    /// Successful cached records (no error) for a domain
    fn get_crawled_pages_for_domain(&self, domain: &str) -> StorageResult<Vec<PageRecord>>;

    // ===== Discovery Queue =====

    /// Queues a URL unless it is already known
    ///
    /// # Returns
    ///
    /// `true` if the URL was newly queued
    fn add_discovered_url(&mut self, target: &CrawlTarget) -> StorageResult<bool>;

    /// Gets up to `limit` uncrawled URLs for a domain in discovery order
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain to pull from
    /// * `limit` - Maximum number of URLs returned
    /// * `prioritize_homepage` - Move the site root to the front of the batch
    fn get_uncrawled_urls(
        &self,
        domain: &str,
        limit: usize,
        prioritize_homepage: bool,
    ) -> StorageResult<Vec<String>>;

    /// Marks a URL as crawled, queueing it first if it was never queued
    fn mark_url_as_crawled(&mut self, url: &str, domain: &str) -> StorageResult<()>;

    // ===== Maintenance =====

    /// Removes every cached page and queued URL of a domain
    fn clear_domain(&mut self, domain: &str) -> StorageResult<()>;

    /// Counts queue and cache entries for a domain
    fn domain_stats(&self, domain: &str) -> StorageResult<DomainStats>;
}
