//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - SEO metadata: title, meta tags, OpenGraph, headings, JSON-LD
//! - Link and image statistics

use crate::url::normalize_url;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Metadata extracted from an HTML page at fetch time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    /// Absolute canonical URL
    pub canonical: Option<String>,
    /// Content of `<meta name="robots">`
    pub robots: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    /// Parsed JSON-LD blocks; blocks that fail to parse are skipped
    pub structured_data: Vec<Value>,
    /// Links to the page's own host
    pub internal_links: usize,
    /// Links to any other host
    pub external_links: usize,
    pub image_count: usize,
    /// Images with a non-empty alt attribute
    pub images_with_alt: usize,
    /// Length of the HTML document in bytes
    pub content_length: usize,
    /// Normalized outgoing links, resolved against the URL the page was
    /// served from; filled in by the page fetcher
    pub links: Vec<String>,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub metadata: PageMetadata,

    /// Normalized, deduplicated absolute links in document order
    pub links: Vec<String>,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that does not resolve to http(s)
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, for resolving relative links
///
/// # Example
///
/// ```
/// use site_crawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page/">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.metadata.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let mut metadata = PageMetadata {
        title: extract_title(&document),
        h1: heading_texts(&document, "h1"),
        h2: heading_texts(&document, "h2"),
        h3: heading_texts(&document, "h3"),
        structured_data: extract_json_ld(&document),
        canonical: extract_canonical(&document, base_url),
        content_length: html.len(),
        ..Default::default()
    };

    apply_meta_tags(&document, &mut metadata);
    count_images(&document, &mut metadata);

    let anchors = anchor_links(&document, base_url);
    let base_host = base_url.host_str().map(|h| h.to_ascii_lowercase());
    for link in &anchors {
        let host = link.host_str().map(|h| h.to_ascii_lowercase());
        if host.is_some() && host == base_host {
            metadata.internal_links += 1;
        } else {
            metadata.external_links += 1;
        }
    }

    let mut seen = HashSet::new();
    let links: Vec<String> = anchors
        .iter()
        .map(|url| url.as_str())
        .chain(metadata.canonical.as_deref())
        .map(normalize_url)
        .filter(|url| seen.insert(url.clone()))
        .collect();

    ParsedPage { metadata, links }
}

/// Extracts metadata only
pub fn extract_metadata(html: &str, base_url: &Url) -> PageMetadata {
    parse_html(html, base_url).metadata
}

/// Extracts the normalized absolute links of a page, canonical included
pub fn extract_urls(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url).links
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector("title")?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element_text(element)))
        .filter(|s| !s.is_empty())
}

fn extract_canonical(document: &Html, base_url: &Url) -> Option<String> {
    let canonical_selector = selector("link[rel='canonical'][href]")?;

    document
        .select(&canonical_selector)
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, base_url))
        .map(|url| url.to_string())
}

/// Fills the fields carried by `<meta>` tags
///
/// Names and properties are matched case-insensitively; the first
/// non-empty occurrence wins.
fn apply_meta_tags(document: &Html, metadata: &mut PageMetadata) {
    let Some(meta_selector) = selector("meta[content]") else {
        return;
    };

    for element in document.select(&meta_selector) {
        let attrs = element.value();
        let Some(content) = attrs.attr("content").map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        let key = attrs
            .attr("name")
            .or_else(|| attrs.attr("property"))
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        let slot = match key.as_str() {
            "description" => &mut metadata.description,
            "keywords" => &mut metadata.keywords,
            "robots" => &mut metadata.robots,
            "og:title" => &mut metadata.og_title,
            "og:description" => &mut metadata.og_description,
            "og:image" => &mut metadata.og_image,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(content.to_string());
        }
    }
}

fn heading_texts(document: &Html, tag: &str) -> Vec<String> {
    let Some(heading_selector) = selector(tag) else {
        return Vec::new();
    };

    document
        .select(&heading_selector)
        .map(|element| collapse_whitespace(&element_text(element)))
        .filter(|text| !text.is_empty())
        .collect()
}

fn extract_json_ld(document: &Html) -> Vec<Value> {
    let Some(script_selector) = selector("script[type='application/ld+json']") else {
        return Vec::new();
    };

    document
        .select(&script_selector)
        .filter_map(|element| serde_json::from_str::<Value>(element_text(element).trim()).ok())
        .collect()
}

fn count_images(document: &Html, metadata: &mut PageMetadata) {
    let Some(img_selector) = selector("img") else {
        return;
    };

    for element in document.select(&img_selector) {
        metadata.image_count += 1;
        if element
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty())
        {
            metadata.images_with_alt += 1;
        }
    }
}

/// Resolved targets of every followable `<a href>`
fn anchor_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Some(a_selector) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
