//! Schedule page HTML parsing.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::FilmCandidate;

/// Default venue-count threshold: only films showing at strictly more
/// venues are kept.
pub const DEFAULT_MIN_VENUE_COUNT: usize = 30;

#[allow(clippy::expect_used)]
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".m-disp-table").expect("failed to compile row selector"));

#[allow(clippy::expect_used)]
static TITLE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3 a[href]").expect("failed to compile title selector"));

#[allow(clippy::expect_used)]
static VENUE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".b-td-item").expect("failed to compile venue selector"));

/// Extracts film candidates from the schedule page.
///
/// Each `.m-disp-table` row contributes its heading title and link;
/// the venue count is the number of `.b-td-item` entries in the row's
/// next sibling block. Rows missing any of that markup are silently
/// skipped, and rows at `min_venue_count` venues or fewer are filtered
/// out.
#[must_use]
pub fn parse_schedule(html: &str, min_venue_count: usize) -> Vec<FilmCandidate> {
    let document = Html::parse_document(html);
    let mut films = Vec::new();

    for row in document.select(&ROW_SEL) {
        match parse_row(row) {
            Some(candidate) if candidate.venue_count > min_venue_count => films.push(candidate),
            Some(candidate) => tracing::debug!(
                title = %candidate.title,
                venue_count = candidate.venue_count,
                "below venue threshold, skipped"
            ),
            None => tracing::debug!("schedule row missing expected markup, skipped"),
        }
    }

    films
}

/// Parses one schedule row, or `None` if the expected markup is
/// absent.
fn parse_row(row: ElementRef<'_>) -> Option<FilmCandidate> {
    let link = row.select(&TITLE_LINK_SEL).next()?;
    let title = link.text().collect::<String>().trim().to_owned();
    if title.is_empty() {
        return None;
    }
    let source_url = link.value().attr("href")?.to_owned();

    let venues = row.next_siblings().find_map(ElementRef::wrap)?;
    let venue_count = venues.select(&VENUE_SEL).count();

    Some(FilmCandidate {
        title,
        source_url,
        venue_count,
    })
}
