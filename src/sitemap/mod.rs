//! Sitemap discovery module
//!
//! This module finds a site's sitemaps (robots.txt directives plus well-known
//! locations), walks sitemap indexes breadth-first within fixed bounds, and
//! returns the page URLs they list as crawl seeds.

mod fetch;
mod parser;
mod resolver;

pub use fetch::fetch_sitemap;
pub use parser::{parse_sitemap, SitemapDocument, SitemapRef, SitemapUrl};
pub use resolver::{
    discover_urls_from_sitemaps, DiscoveredUrl, DiscoveryOptions, UrlSource,
    MAX_SITEMAPS_PER_LEVEL, MAX_URLS_PER_SITEMAP,
};
