//! `PageCache` - SQLite-backed page cache with TTL and bounded capacity.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::migrations::run_migrations;

/// Default entry time-to-live (24 hours).
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of cached entries.
const DEFAULT_CAPACITY: usize = 100;

/// A raw HTTP response as stored in the cache.
///
/// The whole response is cached regardless of status code, so a cached
/// error page is replayed the same way a cached success is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: String,
}

/// SQLite-backed page cache.
///
/// Entries older than the TTL are treated as absent on read. When the
/// entry count exceeds the capacity after a write, the
/// least-recently-set entries are evicted.
#[derive(Debug)]
pub struct PageCache {
    /// Database connection.
    conn: Mutex<Connection>,
    /// Entry time-to-live.
    ttl: Duration,
    /// Maximum number of entries kept after a write.
    capacity: usize,
}

/// Builder for `PageCache`.
#[derive(Debug)]
pub struct PageCacheBuilder {
    dir: Option<PathBuf>,
    ttl: Option<Duration>,
    capacity: Option<usize>,
}

impl PageCacheBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            dir: None,
            ttl: None,
            capacity: None,
        }
    }

    /// Sets the cache directory (default: `~/.local/share/kinotop`).
    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Sets the entry time-to-live (default: 24 hours).
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the maximum entry count (default: 100).
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Opens (or creates) the cache database and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations
    /// fail.
    pub fn build(self) -> Result<PageCache> {
        let db_path = resolve_cache_path(self.dir.as_ref())?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open cache database {}", db_path.display()))?;

        run_migrations(&conn).context("cache migration failed")?;

        Ok(PageCache {
            conn: Mutex::new(conn),
            ttl: self.ttl.unwrap_or(DEFAULT_TTL),
            capacity: self.capacity.unwrap_or(DEFAULT_CAPACITY),
        })
    }
}

impl PageCache {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> PageCacheBuilder {
        PageCacheBuilder::new()
    }

    /// Looks up a page by its request key.
    ///
    /// Returns `None` for missing keys and for entries older than the
    /// TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored entry is
    /// corrupt.
    pub async fn get(&self, key: &str) -> Result<Option<CachedPage>> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let cutoff = now_secs()?.saturating_sub(ttl_secs);

        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT status, headers, body FROM pages WHERE key = ?1 AND stored_at > ?2",
                params![key, cutoff],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .context("failed to query page cache")?;

        match row {
            None => Ok(None),
            Some((status, headers, body)) => {
                let headers =
                    serde_json::from_str(&headers).context("corrupt cached headers entry")?;
                Ok(Some(CachedPage {
                    status,
                    headers,
                    body,
                }))
            }
        }
    }

    /// Stores a page under its request key, replacing any previous
    /// entry, then evicts entries beyond the capacity
    /// (least-recently-set first).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn set(&self, key: &str, page: &CachedPage) -> Result<()> {
        let headers = serde_json::to_string(&page.headers).context("failed to encode headers")?;
        let stored_at = now_secs()?;
        let capacity = i64::try_from(self.capacity).context("capacity out of range")?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO pages (key, status, headers, body, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key, page.status, headers, page.body, stored_at],
        )
        .context("failed to store page")?;

        // INSERT OR REPLACE assigns a fresh rowid, so rowid order breaks
        // same-second stored_at ties in set order.
        let evicted = conn
            .execute(
                "DELETE FROM pages WHERE key NOT IN
                 (SELECT key FROM pages ORDER BY stored_at DESC, rowid DESC LIMIT ?1)",
                params![capacity],
            )
            .context("failed to evict pages")?;

        if evicted > 0 {
            tracing::debug!(evicted, "evicted least-recently-set cache entries");
        }

        Ok(())
    }

    /// Removes all entries. Returns the number of removed entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn clear(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM pages", [])
            .context("failed to clear page cache")
    }

    /// Returns the number of stored entries, including expired ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn entry_count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .context("failed to count page cache entries")
    }
}

/// Resolves the cache database file path.
fn resolve_cache_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join("kinotop-cache.db"));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("kinotop")
        .join("kinotop-cache.db"))
}

/// Current Unix time in seconds.
fn now_secs() -> Result<i64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?;
    i64::try_from(now.as_secs()).context("timestamp out of range")
}
