//! Sitemap XML parsing
//!
//! A single pass over the document classifies it by its root element and
//! collects the entries underneath.

use crate::SitemapError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A child sitemap listed in a sitemap index
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapRef {
    pub url: String,
    pub lastmod: Option<String>,
}

/// A page listed in a urlset
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub url: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    /// `None` when absent or not a number
    pub priority: Option<f64>,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: links to further sitemaps
    Index(Vec<SitemapRef>),
    /// `<urlset>`: links to pages
    UrlSet(Vec<SitemapUrl>),
    /// Any other root element, or no root element at all
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Root {
    Index,
    UrlSet,
    Other,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    LastMod,
    ChangeFreq,
    Priority,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Self::Loc),
            b"lastmod" => Some(Self::LastMod),
            b"changefreq" => Some(Self::ChangeFreq),
            b"priority" => Some(Self::Priority),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    loc: String,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

impl Entry {
    fn set(&mut self, field: Field, value: &str) {
        let value = value.trim();
        match field {
            Field::Loc => self.loc = value.to_string(),
            Field::LastMod => self.lastmod = non_empty(value),
            Field::ChangeFreq => self.changefreq = non_empty(value),
            Field::Priority => self.priority = non_empty(value),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn classify_root(name: &[u8]) -> Root {
    match name {
        b"sitemapindex" => Root::Index,
        b"urlset" => Root::UrlSet,
        _ => Root::Other,
    }
}

fn entry_name(root: Root) -> Option<&'static [u8]> {
    match root {
        Root::Index => Some(&b"sitemap"[..]),
        Root::UrlSet => Some(&b"url"[..]),
        Root::Other => None,
    }
}

/// Parses and classifies a sitemap document
///
/// Namespace prefixes are ignored. Entries without a `<loc>` are dropped.
///
/// # Arguments
///
/// * `source` - URL the document was fetched from (used in errors)
/// * `xml` - The document body
///
/// # Returns
///
/// * `Ok(SitemapDocument)` - The classified document
/// * `Err(SitemapError::Parse)` - Mismatched or unclosed tags, or bad escapes
pub fn parse_sitemap(source: &str, xml: &str) -> Result<SitemapDocument, SitemapError> {
    let parse_error = |message: String| SitemapError::Parse {
        url: source.to_string(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    let mut refs = Vec::new();
    let mut urls = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match depth {
                    0 if root.is_none() => root = Some(classify_root(name.as_ref())),
                    1 if root.and_then(entry_name) == Some(name.as_ref()) => {
                        entry = Some(Entry::default());
                    }
                    2 if entry.is_some() => {
                        field = Field::from_name(name.as_ref());
                        text.clear();
                    }
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 && root.is_none() {
                    root = Some(classify_root(e.local_name().as_ref()));
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let value = e.unescape().map_err(|e| parse_error(e.to_string()))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                match depth {
                    2 => {
                        if let (Some(f), Some(current)) = (field.take(), entry.as_mut()) {
                            current.set(f, &text);
                        }
                    }
                    1 => {
                        if let Some(done) = entry.take() {
                            if done.loc.is_empty() {
                                continue;
                            }
                            match root {
                                Some(Root::Index) => refs.push(SitemapRef {
                                    url: done.loc,
                                    lastmod: done.lastmod,
                                }),
                                Some(Root::UrlSet) => urls.push(SitemapUrl {
                                    url: done.loc,
                                    lastmod: done.lastmod,
                                    changefreq: done.changefreq,
                                    priority: done
                                        .priority
                                        .and_then(|p| p.parse::<f64>().ok())
                                        .filter(|p| p.is_finite()),
                                }),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(parse_error(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(parse_error("unexpected end of document: unclosed element".to_string()));
    }

    Ok(match root {
        Some(Root::Index) => SitemapDocument::Index(refs),
        Some(Root::UrlSet) => SitemapDocument::UrlSet(urls),
        _ => SitemapDocument::Unknown,
    })
}
