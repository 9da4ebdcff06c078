//! Scraping and enrichment library for kinotop.
//!
//! Fetches the list of currently showing films from the Afisha
//! schedule page, enriches each film with Kinopoisk metadata through a
//! shared persistent page cache, and ranks the results by rating.

/// Afisha schedule-listing client.
pub mod afisha;
/// Shared page fetcher with response caching.
pub mod fetch;
/// Kinopoisk detail-lookup client.
pub mod kinopoisk;
/// Enrichment orchestrator and ranking.
pub mod top;
/// Film data types.
pub mod types;
