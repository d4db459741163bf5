use crate::crawler::{FetchResult, Fetcher};
use crate::sitemap::parser::{parse_sitemap, SitemapDocument};
use crate::SitemapError;

/// Fetches and parses one sitemap document
///
/// Only an HTTP 200 response is parsed. Redirects are followed by the
/// discovery client; any other final status is reported as a fetch failure,
/// including 4xx.
///
/// # Arguments
///
/// * `fetcher` - HTTP boundary (bot user agent, sitemap timeout)
/// * `url` - Absolute sitemap URL
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The classified document
/// * `Err(SitemapError::Fetch)` - Network failure or non-200 status
/// * `Err(SitemapError::Parse)` - Malformed XML
pub async fn fetch_sitemap(fetcher: &Fetcher, url: &str) -> Result<SitemapDocument, SitemapError> {
    match fetcher.fetch_sitemap(url).await {
        FetchResult::Success {
            status_code: 200,
            body,
            ..
        } => parse_sitemap(url, &body),
        FetchResult::Success { status_code, .. } => Err(SitemapError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", status_code),
        }),
        FetchResult::Failed { error, .. } => Err(SitemapError::Fetch {
            url: url.to_string(),
            message: error,
        }),
    }
}
