//! Robots.txt parser implementation
//!
//! Allow/Disallow matching is delegated to the robotstxt crate; `Sitemap:`
//! directives are read line by line since they apply to every user agent.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The user agent product token (e.g. "SiteCrawler")
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Values of every `Sitemap:` directive, in file order
    ///
    /// The directive name is matched case-insensitively. Values are returned
    /// as written; resolving relative ones is up to the caller.
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once(':')?;
                if !key.trim().eq_ignore_ascii_case("sitemap") {
                    return None;
                }
                let value = value.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            })
            .collect()
    }
}
