//! Kinopoisk detail-lookup client module.
//!
//! Resolves a film title through the site's search endpoint and
//! extracts rating, cast, and release metadata from the film page.

mod api;
mod client;
mod parser;

#[allow(clippy::module_name_repetitions)]
pub use api::{DetailApi, LocalDetailApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{KINOPOISK_SEARCH_URL, KinopoiskClient, KinopoiskClientBuilder};
pub use parser::parse_film_page;
