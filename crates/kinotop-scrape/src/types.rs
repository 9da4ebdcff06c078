//! Film data types shared across the crate.

use serde::Serialize;

/// A film discovered on the schedule page, pre-enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmCandidate {
    /// Film title as shown on the schedule page.
    pub title: String,
    /// Link to the film's page on the schedule site.
    pub source_url: String,
    /// Number of venues currently showing the film.
    pub venue_count: usize,
}

/// Enrichment metadata for one film.
///
/// `Default` is the all-defaults record (`rating` 0.0, `rating_count`
/// 0, everything else `None`) used whenever the detail page cannot be
/// parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilmDetail {
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Rating on the detail site.
    pub rating: f64,
    /// Number of rating votes.
    pub rating_count: u64,
    /// Comma-joined cast list.
    pub actors: Option<String>,
    /// Comma-joined release year(s).
    pub year: Option<String>,
    /// Comma-joined production country list.
    pub country: Option<String>,
    /// Comma-joined genre list.
    pub genre: Option<String>,
}

/// A fully enriched film, the unit returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Film {
    /// Film title.
    pub title: String,
    /// Link to the film's page on the schedule site.
    pub source_url: String,
    /// Number of venues currently showing the film.
    pub venue_count: usize,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Rating on the detail site (0.0 when unknown).
    pub rating: f64,
    /// Number of rating votes.
    pub rating_count: u64,
    /// Comma-joined cast list.
    pub actors: Option<String>,
    /// Comma-joined release year(s).
    pub year: Option<String>,
    /// Comma-joined production country list.
    pub country: Option<String>,
    /// Comma-joined genre list.
    pub genre: Option<String>,
}

impl Film {
    /// Merges a schedule candidate with its detail record.
    #[must_use]
    pub fn merge(candidate: FilmCandidate, detail: FilmDetail) -> Self {
        Self {
            title: candidate.title,
            source_url: candidate.source_url,
            venue_count: candidate.venue_count,
            cover_url: detail.cover_url,
            rating: detail.rating,
            rating_count: detail.rating_count,
            actors: detail.actors,
            year: detail.year,
            country: detail.country,
            genre: detail.genre,
        }
    }
}
