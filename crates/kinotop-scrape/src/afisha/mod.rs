//! Afisha schedule-listing client module.
//!
//! Fetches the cinema schedule page and extracts the films currently
//! showing at more venues than the configured minimum.

mod api;
mod client;
mod parser;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalScheduleApi, ScheduleApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{AFISHA_SCHEDULE_URL, AfishaClient, AfishaClientBuilder};
pub use parser::{DEFAULT_MIN_VENUE_COUNT, parse_schedule};
