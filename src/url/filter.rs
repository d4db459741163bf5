use crate::ConfigError;
use regex::Regex;
use url::{Position, Url};

/// File extensions that never lead to an HTML page
const DEFAULT_EXTENSIONS: &[&str] = &[
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf", "csv",
    // images
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico", "tif", "tiff", "avif",
    // audio / video
    "mp3", "mp4", "m4a", "wav", "ogg", "webm", "avi", "mov", "wmv", "flv", "mkv",
    // archives and binaries
    "zip", "rar", "gz", "tgz", "tar", "7z", "exe", "dmg", "msi", "apk", "iso", "bin",
    // assets and data
    "css", "js", "json", "xml", "txt", "rss", "atom",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
];

/// Path prefixes for admin, auth, API, feed and listing pages
const DEFAULT_PATH_PREFIXES: &[&str] = &[
    "/wp-admin",
    "/wp-login.php",
    "/wp-json",
    "/admin",
    "/login",
    "/logout",
    "/signin",
    "/signup",
    "/register",
    "/auth",
    "/oauth",
    "/account",
    "/api",
    "/feed",
    "/rss",
    "/tag",
    "/tags",
    "/category",
    "/categories",
    "/author",
    "/search",
    "/cart",
    "/checkout",
    "/print",
];

/// Patterns matched against path, query and fragment
const DEFAULT_PATTERNS: &[&str] = &[
    r"[?&]print=",
    r"/print(/|$)",
    r"#",
    r"/feed(/|$)",
    r"[?&]s=",
    r"/(tag|category|author)/",
    r"/wp-content/",
    r"[?&]replytocom=",
];

/// Denylist applied to candidate URLs before they are queued
///
/// `FilterRules::default()` carries the built-in rules. `FilterRules::empty()`
/// keeps only the scheme and host checks of [`should_crawl`].
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Lowercase path prefixes, matched on whole segments
    pub path_prefixes: Vec<String>,
    pub patterns: Vec<Regex>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            path_prefixes: DEFAULT_PATH_PREFIXES.iter().map(|s| s.to_string()).collect(),
            patterns: DEFAULT_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

impl FilterRules {
    /// Rules that exclude nothing
    pub fn empty() -> Self {
        Self {
            extensions: Vec::new(),
            path_prefixes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Extends the rules with additional extensions, prefixes and regexes
    ///
    /// # Returns
    ///
    /// * `Ok(FilterRules)` - The extended rules
    /// * `Err(ConfigError::InvalidPattern)` - A pattern failed to compile
    pub fn with_extra(
        mut self,
        extensions: &[String],
        path_prefixes: &[String],
        patterns: &[String],
    ) -> Result<Self, ConfigError> {
        for ext in extensions {
            let ext = ext.trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }

        for prefix in path_prefixes {
            let prefix = prefix.trim_end_matches('/').to_lowercase();
            if !prefix.is_empty() && !self.path_prefixes.contains(&prefix) {
                self.path_prefixes.push(prefix);
            }
        }

        for pattern in patterns {
            let regex = Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
            self.patterns.push(regex);
        }

        Ok(self)
    }

    /// True when the URL hits any denylist entry
    pub fn is_excluded(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();

        if let Some(last) = path.rsplit('/').next() {
            if let Some((_, ext)) = last.rsplit_once('.') {
                if self.extensions.iter().any(|e| e == ext) {
                    return true;
                }
            }
        }

        let prefix_hit = self.path_prefixes.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        });
        if prefix_hit {
            return true;
        }

        let tail = &url[Position::BeforePath..];
        self.patterns.iter().any(|re| re.is_match(tail))
    }
}

/// Decides whether a URL belongs in the crawl frontier
///
/// A URL passes when its scheme is http or https, its host equals
/// `base_domain` (ASCII case-insensitive, subdomains do not count) and it
/// matches none of the `rules`.
///
/// # Arguments
///
/// * `url_str` - Absolute URL to check
/// * `base_domain` - Hostname of the site being crawled
/// * `rules` - Denylist to apply
///
/// # Returns
///
/// `false` for anything that does not parse
pub fn should_crawl(url_str: &str, base_domain: &str, rules: &FilterRules) -> bool {
    let url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(base_domain) => {}
        _ => return false,
    }

    !rules.is_excluded(&url)
}
