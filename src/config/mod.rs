//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning them into the option values the crawler consumes.
//!
//! # Example
//!
//! ```no_run
//! use site_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FilterConfig, OutputConfig, SitemapConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

use crate::crawler::CrawlOptions;
use crate::sitemap::DiscoveryOptions;
use crate::url::FilterRules;
use crate::ConfigError;
use std::time::Duration;

impl Config {
    /// Options for the crawl loop
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            max_pages: self.crawler.max_pages,
            parallel: self.crawler.parallel,
            crawl_delay: Duration::from_millis(self.crawler.crawl_delay),
            filter_urls: true,
            use_sitemaps: self.crawler.use_sitemaps,
            respect_robots: self.crawler.respect_robots,
            discovery: self.discovery_options(),
        }
    }

    /// Options for sitemap discovery
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            max_urls: self.sitemap.max_urls,
            max_depth: self.sitemap.max_depth,
            max_sitemaps: self.sitemap.max_sitemaps,
        }
    }

    /// Built-in denylist extended with the `[filter]` section
    pub fn filter_rules(&self) -> Result<FilterRules, ConfigError> {
        FilterRules::default().with_extra(
            &self.filter.extra_extensions,
            &self.filter.extra_path_prefixes,
            &self.filter.exclude_patterns,
        )
    }
}
