//! In-memory storage implementation
//!
//! Nothing survives the process. Used by tests and by runs that should not
//! touch the database.

use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{take_batch, CrawlTarget, DomainStats, PageRecord};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct QueueEntry {
    target: CrawlTarget,
    crawled: bool,
}

/// Storage backend backed by hash maps
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pages: HashMap<String, PageRecord>,
    /// Save order, so domain listings are stable
    page_order: Vec<String>,
    queue: Vec<QueueEntry>,
    queue_index: HashMap<String, usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_cached_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        Ok(self.pages.get(url).cloned())
    }

    fn save_cached_page(&mut self, page: &PageRecord) -> StorageResult<()> {
        if self.pages.insert(page.url.clone(), page.clone()).is_none() {
            self.page_order.push(page.url.clone());
        }
        Ok(())
    }

    fn get_crawled_pages_for_domain(&self, domain: &str) -> StorageResult<Vec<PageRecord>> {
        Ok(self
            .page_order
            .iter()
            .filter_map(|url| self.pages.get(url))
            .filter(|page| page.domain == domain && page.is_success())
            .cloned()
            .collect())
    }

    fn add_discovered_url(&mut self, target: &CrawlTarget) -> StorageResult<bool> {
        if self.queue_index.contains_key(&target.url) {
            return Ok(false);
        }
        self.queue_index.insert(target.url.clone(), self.queue.len());
        self.queue.push(QueueEntry {
            target: target.clone(),
            crawled: false,
        });
        Ok(true)
    }

    fn get_uncrawled_urls(
        &self,
        domain: &str,
        limit: usize,
        prioritize_homepage: bool,
    ) -> StorageResult<Vec<String>> {
        let pending = self
            .queue
            .iter()
            .filter(|entry| !entry.crawled && entry.target.domain == domain)
            .map(|entry| entry.target.url.as_str());

        Ok(take_batch(pending, limit, prioritize_homepage))
    }

    fn mark_url_as_crawled(&mut self, url: &str, domain: &str) -> StorageResult<()> {
        match self.queue_index.get(url) {
            Some(&idx) => self.queue[idx].crawled = true,
            None => {
                self.queue_index.insert(url.to_string(), self.queue.len());
                self.queue.push(QueueEntry {
                    target: CrawlTarget::new(url, domain, None),
                    crawled: true,
                });
            }
        }
        Ok(())
    }

    fn clear_domain(&mut self, domain: &str) -> StorageResult<()> {
        self.pages.retain(|_, page| page.domain != domain);
        let pages = &self.pages;
        self.page_order.retain(|url| pages.contains_key(url));

        self.queue.retain(|entry| entry.target.domain != domain);
        self.queue_index = self
            .queue
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.target.url.clone(), idx))
            .collect();
        Ok(())
    }

    fn domain_stats(&self, domain: &str) -> StorageResult<DomainStats> {
        let in_domain = self.queue.iter().filter(|e| e.target.domain == domain);
        let pages = self.pages.values().filter(|p| p.domain == domain);

        Ok(DomainStats {
            domain: domain.to_string(),
            discovered: in_domain.clone().count() as u64,
            crawled: in_domain.filter(|e| e.crawled).count() as u64,
            cached_pages: pages.clone().count() as u64,
            failed_pages: pages.filter(|p| !p.is_success()).count() as u64,
        })
    }
}
