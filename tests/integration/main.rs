//! Integration tests for sitemap discovery and crawling
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! discovery and crawl cycle end-to-end.

mod crawl_tests;
mod sitemap_tests;

use site_crawler::config::Config;
use wiremock::ResponseTemplate;

/// Configuration with no politeness delay and short timeouts
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.crawl_delay = 0;
    config.crawler.page_timeout = 5;
    config.sitemap.timeout = 5;
    config.sitemap.robots_timeout = 5;
    config
}

/// 200 response with an HTML body
pub fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html",
    )
}

/// 200 response with an XML body
pub fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

/// `<urlset>` document listing `urls`
pub fn urlset(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|url| format!("<url><loc>{}</loc></url>", url.replace('&', "&amp;")))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// `<sitemapindex>` document listing `sitemaps`
pub fn sitemap_index(sitemaps: &[String]) -> String {
    let entries: String = sitemaps
        .iter()
        .map(|url| format!("<sitemap><loc>{}</loc></sitemap>", url))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}
