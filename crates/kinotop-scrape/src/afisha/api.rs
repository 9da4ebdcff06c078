//! `ScheduleApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use crate::types::FilmCandidate;

/// Schedule-listing site trait.
///
/// Abstracts the listing source for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(ScheduleApi: Send)]
pub trait LocalScheduleApi {
    /// Returns the films currently showing at more venues than the
    /// configured minimum, in page order.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn current_films(&self) -> Result<Vec<FilmCandidate>>;
}
