//! Single-page fetch with cache lookup and metadata extraction

use crate::crawler::fetcher::{is_html, FetchResult, Fetcher};
use crate::crawler::lock_storage;
use crate::crawler::parser::{parse_html, ParsedPage};
use crate::storage::{PageRecord, Storage};
use crate::url::{extract_domain, normalize_url};
use crate::Result;
use chrono::Utc;
use std::sync::Mutex;
use url::Url;

/// Fetches one page, going to the network only on a cache miss
///
/// # Flow
///
/// 1. Normalize the URL; give up (`Ok(None)`) if it does not parse
/// 2. A cached record without an error is returned as is
/// 3. Otherwise GET the page and build a fresh record:
///    - HTML with any status below 500: body kept, metadata and links
///      extracted against the post-redirect URL
///    - a non-HTML body: status and content type only
///    - network failure, timeout or 5xx: `error` set
/// 4. Save the record to the cache, failures included
///
/// # Returns
///
/// * `Ok(Some(PageRecord))` - The cached or freshly fetched record
/// * `Ok(None)` - The URL could not be parsed
/// * `Err(CrawlerError)` - The cache could not be read or written
pub async fn crawl_url<S: Storage>(
    fetcher: &Fetcher,
    storage: &Mutex<S>,
    url: &str,
) -> Result<Option<PageRecord>> {
    let normalized = normalize_url(url);
    let Ok(parsed) = Url::parse(&normalized) else {
        tracing::debug!("Skipping unparsable URL: {}", url);
        return Ok(None);
    };
    let Some(domain) = extract_domain(&parsed) else {
        tracing::debug!("Skipping URL without host: {}", url);
        return Ok(None);
    };

    let cached = lock_storage(storage)?.get_cached_page(&normalized)?;
    if let Some(page) = cached.filter(PageRecord::is_success) {
        tracing::trace!("Cache hit: {}", normalized);
        return Ok(Some(page));
    }

    tracing::debug!("Fetching {}", normalized);
    let record = match fetcher.fetch_page(&normalized).await {
        FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        } => {
            let mut record = PageRecord {
                url: normalized.clone(),
                domain,
                html: None,
                title: None,
                meta_description: None,
                status_code: Some(status_code),
                content_type: Some(content_type.clone()).filter(|ct| !ct.is_empty()),
                error: None,
                metadata: None,
                fetched_at: Utc::now().to_rfc3339(),
            };

            // 4xx pages are kept like any other response below 500
            if is_html(&content_type) {
                let base = Url::parse(&final_url).unwrap_or(parsed);
                let ParsedPage {
                    mut metadata,
                    links,
                } = parse_html(&body, &base);
                metadata.links = links;
                record.title = metadata.title.clone();
                record.meta_description = metadata.description.clone();
                record.metadata = Some(metadata);
                record.html = Some(body);
            }
            if status_code >= 400 {
                tracing::debug!("HTTP {} for {}", status_code, normalized);
            }

            record
        }
        FetchResult::Failed { status_code, error } => PageRecord {
            url: normalized.clone(),
            domain,
            html: None,
            title: None,
            meta_description: None,
            status_code,
            content_type: None,
            error: Some(error),
            metadata: None,
            fetched_at: Utc::now().to_rfc3339(),
        },
    };

    lock_storage(storage)?.save_cached_page(&record)?;
    Ok(Some(record))
}
