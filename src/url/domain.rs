use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase domain/host
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses `url_str` and returns its lowercase hostname
///
/// Returns `None` when the string is not an absolute URL or has no host.
pub fn domain_of(url_str: &str) -> Option<String> {
    Url::parse(url_str).ok().as_ref().and_then(extract_domain)
}

/// `scheme://host[:port]` of a URL, without a trailing slash
///
/// The port is only present when it is not the scheme's default.
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Normalized homepage URL (`origin/`) of the site `url` belongs to
pub fn homepage_url(url: &Url) -> Option<String> {
    origin_of(url).map(|origin| format!("{}/", origin))
}

/// True when `url` is the site root, written with or without the trailing slash
pub fn is_homepage(url: &str, origin: &str) -> bool {
    url == origin || url.strip_prefix(origin) == Some("/")
}
