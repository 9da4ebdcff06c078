//! Top-film ranking orchestration.

use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use tracing::instrument;

use crate::afisha::LocalScheduleApi;
use crate::kinopoisk::LocalDetailApi;
use crate::types::{Film, FilmCandidate, FilmDetail};

/// Default cap on concurrent detail lookups.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Default per-film enrichment timeout.
pub const DEFAULT_ENRICH_TIMEOUT: Duration = Duration::from_secs(10);

/// Ranks the films currently showing by their detail-site rating.
///
/// Discovers candidates through the schedule API, enriches each one
/// through the detail API with bounded concurrency, then sorts by
/// rating (descending, discovery order on ties).
#[derive(Debug)]
pub struct Ranker<S, D> {
    schedule: S,
    details: D,
    max_in_flight: usize,
    enrich_timeout: Duration,
}

impl<S, D> Ranker<S, D>
where
    S: LocalScheduleApi + Sync,
    D: LocalDetailApi + Sync,
{
    /// Creates a ranker over the given schedule and detail APIs.
    #[must_use]
    pub const fn new(schedule: S, details: D) -> Self {
        Self {
            schedule,
            details,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            enrich_timeout: DEFAULT_ENRICH_TIMEOUT,
        }
    }

    /// Sets the cap on concurrent detail lookups.
    #[must_use]
    pub const fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Sets the per-film enrichment timeout.
    #[must_use]
    pub const fn enrich_timeout(mut self, timeout: Duration) -> Self {
        self.enrich_timeout = timeout;
        self
    }

    /// Returns the top `count` films by rating, descending.
    ///
    /// A film whose detail lookup fails or times out keeps its schedule
    /// data and falls back to the all-defaults detail record; one slow
    /// or broken lookup never drops the rest of the listing. Films with
    /// equal ratings keep their schedule-page order.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule fetch itself fails.
    #[instrument(skip_all, fields(count))]
    pub async fn rank_top_films(&self, count: usize) -> Result<Vec<Film>> {
        let candidates = self
            .schedule
            .current_films()
            .await
            .context("schedule fetch failed")?;

        tracing::info!(candidates = candidates.len(), "schedule fetched");

        let mut enriched: Vec<(usize, Film)> =
            futures::stream::iter(candidates.into_iter().enumerate())
                .map(|(idx, candidate)| self.enrich(idx, candidate))
                .buffer_unordered(self.max_in_flight.max(1))
                .collect()
                .await;

        // Restore discovery order so equal ratings tie-break by page order.
        enriched.sort_unstable_by_key(|&(idx, _)| idx);
        let mut films: Vec<Film> = enriched.into_iter().map(|(_, film)| film).collect();

        films.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        films.truncate(count);

        tracing::info!(returned = films.len(), "ranking completed");
        Ok(films)
    }

    /// Enriches one candidate, degrading to defaults on failure.
    async fn enrich(&self, idx: usize, candidate: FilmCandidate) -> (usize, Film) {
        let lookup = self.details.film_details(&candidate.title);
        let detail = match tokio::time::timeout(self.enrich_timeout, lookup).await {
            Ok(Ok(detail)) => detail,
            Ok(Err(err)) => {
                tracing::warn!(title = %candidate.title, error = %err, "detail lookup failed");
                FilmDetail::default()
            }
            Err(_) => {
                tracing::warn!(
                    title = %candidate.title,
                    timeout_ms = self.enrich_timeout.as_millis(),
                    "detail lookup timed out"
                );
                FilmDetail::default()
            }
        };

        (idx, Film::merge(candidate, detail))
    }
}
