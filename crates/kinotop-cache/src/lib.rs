//! Persistent page cache for kinotop.
//!
//! Stores raw HTTP responses keyed by request signature in a local
//! SQLite database, with TTL expiry and a bounded entry count.

/// Cache store and entry types.
mod cache;
/// Schema migrations.
mod migrations;

pub use cache::{CachedPage, PageCache, PageCacheBuilder};
