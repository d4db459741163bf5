//! Database schema definitions
//!
//! This module contains the SQL schema for the page cache and discovery queue.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One record per fetched URL, overwritten on re-crawl
CREATE TABLE IF NOT EXISTS page_cache (
    url TEXT PRIMARY KEY,
    domain TEXT NOT NULL,
    html TEXT,
    title TEXT,
    meta_description TEXT,
    status_code INTEGER,
    content_type TEXT,
    error TEXT,
    metadata TEXT,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_page_cache_domain ON page_cache(domain);

-- Persistent crawl frontier
CREATE TABLE IF NOT EXISTS discovered_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    domain TEXT NOT NULL,
    discovered_from TEXT,
    discovered_at TEXT NOT NULL,
    crawled INTEGER NOT NULL DEFAULT 0,
    crawled_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_discovered_domain_crawled ON discovered_urls(domain, crawled);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
