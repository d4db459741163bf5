//! HTTP fetcher implementation
//!
//! This module is the crawler's only HTTP boundary:
//! - A page client with a browser-compatible user agent and headers
//! - A discovery client (sitemaps, robots.txt) identifying the bot
//! - Per-request timeouts and bounded redirect following
//! - Error classification: any status below 500 is a completed fetch

use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The server answered with a status below 500
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty when absent)
        content_type: String,
        /// Response body
        body: String,
    },

    /// Network error, timeout, or a 5xx status
    Failed {
        /// HTTP status code, when the server answered
        status_code: Option<u16>,
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// HTTP status code, if a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } => Some(*status_code),
            Self::Failed { status_code, .. } => *status_code,
        }
    }
}

/// Returns true when a Content-Type header denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// HTTP clients and timeouts used for a crawl
#[derive(Debug, Clone)]
pub struct Fetcher {
    page_client: Client,
    discovery_client: Client,
    page_timeout: Duration,
    sitemap_timeout: Duration,
    robots_timeout: Duration,
}

impl Fetcher {
    /// Builds both HTTP clients from the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Fetcher)` - Successfully built clients
    /// * `Err(reqwest::Error)` - Failed to build a client
    ///
    /// # Example
    ///
    /// ```no_run
    /// use site_crawler::config::Config;
    /// use site_crawler::crawler::Fetcher;
    ///
    /// let fetcher = Fetcher::new(&Config::default()).unwrap();
    /// ```
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let page_client = Client::builder()
            .user_agent(config.user_agent.browser_user_agent())
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(config.crawler.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()?;

        let discovery_client = Client::builder()
            .user_agent(config.user_agent.bot_user_agent())
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(config.sitemap.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            page_client,
            discovery_client,
            page_timeout: Duration::from_secs(config.crawler.page_timeout),
            sitemap_timeout: Duration::from_secs(config.sitemap.timeout),
            robots_timeout: Duration::from_secs(config.sitemap.robots_timeout),
        })
    }

    /// Fetches an HTML page with the browser-compatible client
    pub async fn fetch_page(&self, url: &str) -> FetchResult {
        fetch_url(&self.page_client, url, self.page_timeout).await
    }

    /// Fetches a sitemap document with the bot client
    pub async fn fetch_sitemap(&self, url: &str) -> FetchResult {
        fetch_url(&self.discovery_client, url, self.sitemap_timeout).await
    }

    /// Fetches a robots.txt file with the bot client
    pub async fn fetch_robots(&self, url: &str) -> FetchResult {
        fetch_url(&self.discovery_client, url, self.robots_timeout).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | Status < 500 | `Success` with the body (including 3xx/4xx) |
/// | Status >= 500 | `Failed` with the status code |
/// | Timeout | `Failed`, no status |
/// | Connection error | `Failed`, no status |
/// | Redirect limit exceeded | `Failed`, no status |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Whole-request timeout
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status.is_server_error() {
        return FetchResult::Failed {
            status_code: Some(status.as_u16()),
            error: format!("HTTP {}", status.as_u16()),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::Failed {
            status_code: Some(status.as_u16()),
            error: format!("Failed to read body: {}", e),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };

    FetchResult::Failed {
        status_code: None,
        error,
    }
}
