//! `DetailApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use crate::types::FilmDetail;

/// Detail-lookup site trait.
///
/// Abstracts the enrichment source for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(DetailApi: Send)]
pub trait LocalDetailApi {
    /// Looks up a film by title and returns its detail record.
    ///
    /// Pages that cannot be parsed (including search disambiguation
    /// pages) yield the all-defaults record, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails.
    async fn film_details(&self, title: &str) -> Result<FilmDetail>;
}
