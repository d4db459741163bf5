//! Statistics from the crawl database
//!
//! This module reads per-domain queue and cache counts from the storage
//! layer and prints them for `--stats`.

use crate::storage::{DomainStats, Storage};
use crate::Result;

/// Loads statistics for one domain
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `domain` - Domain key, as produced by `domain_of`
///
/// # Returns
///
/// * `Ok(DomainStats)` - Queue and cache counts
/// * `Err(CrawlerError)` - Failed to query storage
pub fn load_statistics<S: Storage + ?Sized>(storage: &S, domain: &str) -> Result<DomainStats> {
    Ok(storage.domain_stats(domain)?)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DomainStats) {
    println!("=== Crawl Statistics: {} ===\n", stats.domain);

    println!("Queue:");
    println!("  Discovered URLs: {}", stats.discovered);
    println!("  Crawled URLs: {}", stats.crawled);
    println!("  Pending URLs: {}", stats.pending());
    println!();

    println!("Cache:");
    println!("  Cached pages: {}", stats.cached_pages);
    println!("  Failed pages: {}", stats.failed_pages);

    println!(
        "\nSuccess Rate: {:.1}% ({} / {} cached pages)",
        stats.success_rate(),
        stats.cached_pages.saturating_sub(stats.failed_pages),
        stats.cached_pages
    );
}

impl DomainStats {
    /// URLs queued but not yet crawled
    pub fn pending(&self) -> u64 {
        self.discovered.saturating_sub(self.crawled)
    }

    /// Share of cached pages without an error, in percent
    pub fn success_rate(&self) -> f64 {
        if self.cached_pages == 0 {
            return 0.0;
        }
        let ok = self.cached_pages.saturating_sub(self.failed_pages);
        ok as f64 / self.cached_pages as f64 * 100.0
    }
}
