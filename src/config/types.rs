use serde::Deserialize;

/// Main configuration structure for the crawler
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub sitemap: SitemapConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub filter: FilterConfig,
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of successful pages returned per site
    pub max_pages: usize,

    /// Maximum number of page fetches in flight
    pub parallel: usize,

    /// Delay before each page fetch (milliseconds)
    pub crawl_delay: u64,

    /// Page request timeout (seconds)
    pub page_timeout: u64,

    /// Redirects followed for page requests
    pub max_redirects: usize,

    /// Seed the frontier from sitemap discovery
    pub use_sitemaps: bool,

    /// Skip URLs disallowed by the site's robots.txt
    pub respect_robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            parallel: 5,
            crawl_delay: 1000,
            page_timeout: 30,
            max_redirects: 5,
            use_sitemaps: true,
            respect_robots: false,
        }
    }
}

/// Sitemap discovery limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SitemapConfig {
    /// Maximum number of URLs returned by discovery
    pub max_urls: usize,

    /// Maximum nesting depth followed through sitemap indexes
    pub max_depth: usize,

    /// Maximum number of candidate sitemaps considered
    pub max_sitemaps: usize,

    /// Sitemap request timeout (seconds)
    pub timeout: u64,

    /// robots.txt request timeout (seconds)
    pub robots_timeout: u64,

    /// Redirects followed for sitemap and robots.txt requests
    pub max_redirects: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            max_urls: 1000,
            max_depth: 3,
            max_sitemaps: 50,
            timeout: 15,
            robots_timeout: 10,
            max_redirects: 3,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/bot".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Bot-identifying user agent, used for sitemaps and robots.txt
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`
    pub fn bot_user_agent(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }

    /// Browser-compatible user agent, used for page requests
    pub fn browser_user_agent(&self) -> String {
        format!(
            "Mozilla/5.0 (compatible; {}/{}; +{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database holding the page cache and discovery queue
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./crawl.db".to_string(),
        }
    }
}

/// Additions to the built-in URL denylist
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// File extensions to skip (without the leading dot)
    pub extra_extensions: Vec<String>,

    /// Path prefixes to skip (e.g. "/members")
    pub extra_path_prefixes: Vec<String>,

    /// Regular expressions matched against path, query and fragment
    pub exclude_patterns: Vec<String>,
}
