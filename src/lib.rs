//! Site Crawler: sitemap discovery and polite site crawling
//!
//! This crate discovers the pages of a single site from its sitemaps and
//! robots.txt, then crawls them through a persistent, cache-aware frontier
//! while honoring a page budget, a concurrency limit and a politeness delay.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors raised when a whole sitemap document cannot be used
///
/// These never abort discovery: the resolver logs them and moves on to the
/// next sitemap.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse sitemap {url}: {message}")]
    Parse { url: String, message: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOptions, Coordinator};
pub use sitemap::{discover_urls_from_sitemaps, DiscoveredUrl, DiscoveryOptions};
pub use storage::{PageRecord, Storage};
pub use crate::url::{domain_of, normalize_url, should_crawl, FilterRules};
