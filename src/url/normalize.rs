use url::Url;

/// Normalizes a URL so it can serve as a dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; if it does not parse, return the input unchanged
/// 2. Remove the fragment (everything after #)
/// 3. Sort query parameters by key (stable, values untouched) and
///    re-serialize them as `application/x-www-form-urlencoded`
/// 4. Remove an empty query string (trailing ?)
/// 5. Remove trailing slashes from the path, except for the root `/`
///
/// Scheme, host case folding and default ports are left to the URL parser.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// The normalized URL, or the input verbatim when it is not a valid absolute URL
///
/// # Examples
///
/// ```
/// use site_crawler::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://example.com/page/?b=2&a=1#top"),
///     "https://example.com/page?a=1&b=2"
/// );
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    let mut url = match Url::parse(url_str) {
        Ok(url) => url,
        Err(_) => return url_str.to_string(),
    };

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    let path = url.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

/// Query parameters ordered by key; equal keys keep their original order
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}
