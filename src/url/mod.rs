//! URL handling module
//!
//! This module provides URL normalization, domain and origin extraction, and
//! the scope/denylist predicate that decides which URLs enter the frontier.

mod domain;
mod filter;
mod normalize;

// Re-export main functions
pub use domain::{domain_of, extract_domain, homepage_url, is_homepage, origin_of};
pub use filter::{should_crawl, FilterRules};
pub use normalize::normalize_url;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_urls_pass_filter() {
        let rules = FilterRules::default();
        let url = normalize_url("https://example.com/products/?b=2&a=1#reviews");
        assert_eq!(url, "https://example.com/products?a=1&b=2");
        assert!(should_crawl(&url, "example.com", &rules));
    }

    #[test]
    fn test_domain_of_matches_filter_scope() {
        let rules = FilterRules::empty();
        let start = "https://Example.com/start";
        let domain = domain_of(start).unwrap();
        assert!(should_crawl("https://example.com/other", &domain, &rules));
    }
}
