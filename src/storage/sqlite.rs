//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{CrawlTarget, DomainStats, PageRecord};
use crate::CrawlerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const PAGE_COLUMNS: &str = "url, domain, html, title, meta_description, status_code, \
                            content_type, error, metadata, fetched_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, domain: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![domain], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// Row fields in `PAGE_COLUMNS` order, metadata still as JSON
type RawPage = (PageRecord, Option<String>);

fn read_page_row(row: &Row<'_>) -> rusqlite::Result<RawPage> {
    Ok((
        PageRecord {
            url: row.get(0)?,
            domain: row.get(1)?,
            html: row.get(2)?,
            title: row.get(3)?,
            meta_description: row.get(4)?,
            status_code: row.get(5)?,
            content_type: row.get(6)?,
            error: row.get(7)?,
            metadata: None,
            fetched_at: row.get(9)?,
        },
        row.get(8)?,
    ))
}

fn decode_page((mut page, metadata): RawPage) -> StorageResult<PageRecord> {
    if let Some(json) = metadata {
        page.metadata = Some(serde_json::from_str(&json)?);
    }
    Ok(page)
}

impl Storage for SqliteStorage {
    // ===== Page Cache =====

    fn get_cached_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM page_cache WHERE url = ?1", PAGE_COLUMNS),
                params![url],
                read_page_row,
            )
            .optional()?;

        raw.map(decode_page).transpose()
    }

    fn save_cached_page(&mut self, page: &PageRecord) -> StorageResult<()> {
        let metadata = page
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO page_cache ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                PAGE_COLUMNS
            ),
            params![
                page.url,
                page.domain,
                page.html,
                page.title,
                page.meta_description,
                page.status_code,
                page.content_type,
                page.error,
                metadata,
                page.fetched_at,
            ],
        )?;
        Ok(())
    }

    fn get_crawled_pages_for_domain(&self, domain: &str) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM page_cache WHERE domain = ?1 AND error IS NULL \
             ORDER BY fetched_at, url",
            PAGE_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![domain], read_page_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(decode_page).collect()
    }

    // ===== Discovery Queue =====

    fn add_discovered_url(&mut self, target: &CrawlTarget) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO discovered_urls (url, domain, discovered_from, discovered_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![target.url, target.domain, target.discovered_from, now],
        )?;
        Ok(inserted > 0)
    }

    fn get_uncrawled_urls(
        &self,
        domain: &str,
        limit: usize,
        prioritize_homepage: bool,
    ) -> StorageResult<Vec<String>> {
        // A root URL has its first '/' after the scheme as its last character
        let mut stmt = self.conn.prepare(
            "SELECT url FROM discovered_urls
             WHERE domain = ?1 AND crawled = 0
             ORDER BY CASE WHEN ?2 AND instr(substr(url, instr(url, '://') + 3), '/')
                                     = length(substr(url, instr(url, '://') + 3))
                      THEN 0 ELSE 1 END,
                      id
             LIMIT ?3",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let urls = stmt
            .query_map(params![domain, prioritize_homepage, limit], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    fn mark_url_as_crawled(&mut self, url: &str, domain: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE discovered_urls SET crawled = 1, crawled_at = ?1 WHERE url = ?2",
            params![now, url],
        )?;

        if updated == 0 {
            self.conn.execute(
                "INSERT INTO discovered_urls (url, domain, discovered_at, crawled, crawled_at) \
                 VALUES (?1, ?2, ?3, 1, ?3)",
                params![url, domain, now],
            )?;
        }
        Ok(())
    }

    // ===== Maintenance =====

    fn clear_domain(&mut self, domain: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM page_cache WHERE domain = ?1", params![domain])?;
        tx.execute("DELETE FROM discovered_urls WHERE domain = ?1", params![domain])?;
        tx.commit()?;
        Ok(())
    }

    fn domain_stats(&self, domain: &str) -> StorageResult<DomainStats> {
        Ok(DomainStats {
            domain: domain.to_string(),
            discovered: self.count("SELECT COUNT(*) FROM discovered_urls WHERE domain = ?1", domain)?,
            crawled: self.count(
                "SELECT COUNT(*) FROM discovered_urls WHERE domain = ?1 AND crawled = 1",
                domain,
            )?,
            cached_pages: self.count("SELECT COUNT(*) FROM page_cache WHERE domain = ?1", domain)?,
            failed_pages: self.count(
                "SELECT COUNT(*) FROM page_cache WHERE domain = ?1 AND error IS NOT NULL",
                domain,
            )?,
        })
    }
}
