//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching for pages, sitemaps and robots.txt
//! - HTML parsing, metadata and link extraction
//! - Concurrency limiting and politeness delay
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod page;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlOptions};
pub use fetcher::{fetch_url, is_html, FetchResult, Fetcher};
pub use page::crawl_url;
pub use parser::{extract_metadata, extract_urls, parse_html, PageMetadata, ParsedPage};
pub use scheduler::Scheduler;

use crate::{CrawlerError, Result};
use std::sync::{Mutex, MutexGuard};

/// Locks shared storage
///
/// A poisoned lock means a task panicked mid-write, so the storage is
/// reported as unusable instead of being read.
pub(crate) fn lock_storage<S>(storage: &Mutex<S>) -> Result<MutexGuard<'_, S>> {
    storage
        .lock()
        .map_err(|_| CrawlerError::Storage("storage mutex poisoned".to_string()))
}
