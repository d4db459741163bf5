//! Output module for crawl run summaries and statistics
//!
//! This module handles:
//! - Summarizing the pages returned by one crawl run
//! - Reading and printing per-domain database statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics};

use crate::storage::PageRecord;
use std::collections::BTreeMap;

/// Summary of the pages returned by one crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub domain: String,

    /// Number of records
    pub total_pages: usize,

    /// Record count per HTTP status; records without a status are not counted
    pub status_codes: BTreeMap<u16, usize>,

    /// Records carrying an error
    pub errors: usize,

    /// Records with a title
    pub with_title: usize,

    /// Records with a meta description
    pub with_description: usize,

    /// Records with extracted metadata
    pub with_metadata: usize,

    /// Average number of metadata fields present, over records with metadata
    pub average_metadata_coverage: f64,
}

/// Number of metadata fields counted toward coverage
const COVERAGE_FIELDS: usize = 8;

impl RunSummary {
    /// Builds a summary from a run's records
    ///
    /// # Arguments
    ///
    /// * `domain` - The crawled domain
    /// * `pages` - Records returned by `crawl_pages`
    pub fn from_pages(domain: &str, pages: &[PageRecord]) -> Self {
        let mut summary = Self {
            domain: domain.to_string(),
            total_pages: pages.len(),
            ..Default::default()
        };

        let mut coverage_total = 0.0;
        for page in pages {
            if let Some(code) = page.status_code {
                *summary.status_codes.entry(code).or_insert(0) += 1;
            }
            if page.error.is_some() {
                summary.errors += 1;
            }
            if page.title.is_some() {
                summary.with_title += 1;
            }
            if page.meta_description.is_some() {
                summary.with_description += 1;
            }
            if let Some(metadata) = &page.metadata {
                summary.with_metadata += 1;
                let present = [
                    metadata.title.is_some(),
                    metadata.description.is_some(),
                    metadata.keywords.is_some(),
                    metadata.canonical.is_some(),
                    metadata.og_title.is_some(),
                    metadata.og_description.is_some(),
                    !metadata.h1.is_empty(),
                    !metadata.structured_data.is_empty(),
                ]
                .iter()
                .filter(|&&p| p)
                .count();
                coverage_total += present as f64 / COVERAGE_FIELDS as f64;
            }
        }

        if summary.with_metadata > 0 {
            summary.average_metadata_coverage = coverage_total / summary.with_metadata as f64;
        }
        summary
    }

    /// Prints the summary to stdout
    pub fn print(&self) {
        println!("=== Crawl Summary: {} ===\n", self.domain);
        println!("  Pages: {}", self.total_pages);
        println!("  Errors: {}", self.errors);

        if !self.status_codes.is_empty() {
            println!("\nStatus Codes:");
            for (code, count) in &self.status_codes {
                println!("  {}: {}", code, count);
            }
        }

        println!("\nMetadata:");
        println!("  With title: {}", self.with_title);
        println!("  With description: {}", self.with_description);
        println!(
            "  Average coverage: {:.1}% ({} pages with metadata)",
            self.average_metadata_coverage * 100.0,
            self.with_metadata
        );
        println!();
    }
}
