//! Film detail page HTML parsing.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::types::FilmDetail;

#[allow(clippy::expect_used)]
static COVER_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".popupBigImage img[src]").expect("failed to compile cover selector")
});

#[allow(clippy::expect_used)]
static RATING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rating_ball").expect("failed to compile rating selector"));

#[allow(clippy::expect_used)]
static RATING_COUNT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ratingCount").expect("failed to compile rating count selector")
});

#[allow(clippy::expect_used)]
static ACTOR_LIST_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div#actorList ul").expect("failed to compile actor list selector")
});

#[allow(clippy::expect_used)]
static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("failed to compile anchor selector"));

#[allow(clippy::expect_used)]
static INFO_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.info").expect("failed to compile info selector"));

#[allow(clippy::expect_used)]
static YEAR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*=\"year\"]").expect("failed to compile year selector"));

#[allow(clippy::expect_used)]
static COUNTRY_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*=\"country\"]").expect("failed to compile country selector")
});

#[allow(clippy::expect_used)]
static GENRE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href*=\"genre\"]").expect("failed to compile genre selector")
});

/// Extracts a film's detail record from its page.
///
/// Extraction is all-or-nothing: if any expected element is missing or
/// malformed the whole record collapses to `FilmDetail::default()`
/// rather than keeping partially parsed fields. Search disambiguation
/// pages lack the expected markup and fall out the same way.
#[must_use]
pub fn parse_film_page(html: &str) -> FilmDetail {
    let document = Html::parse_document(html);
    extract(&document).unwrap_or_default()
}

/// One failed lookup anywhere aborts the whole extraction.
fn extract(document: &Html) -> Option<FilmDetail> {
    let cover_url = document
        .select(&COVER_SEL)
        .next()?
        .value()
        .attr("src")?
        .to_owned();

    let rating_text: String = document.select(&RATING_SEL).next()?.text().collect();
    let rating: f64 = rating_text.trim().parse().ok()?;

    let count_text: String = document.select(&RATING_COUNT_SEL).next()?.text().collect();
    let rating_count = parse_rating_count(&count_text)?;

    let actor_list = document.select(&ACTOR_LIST_SEL).next()?;
    let names: Vec<String> = actor_list
        .select(&ANCHOR_SEL)
        .map(|a| a.text().collect::<String>().trim().to_owned())
        .collect();
    // The last anchor is the "..." expander link, not a cast member.
    let actors = names
        .split_last()
        .map(|(_, rest)| rest.join(", "))
        .filter(|joined| !joined.is_empty());

    let info = document.select(&INFO_TABLE_SEL).next()?;
    let year = joined_anchor_text(&info, &YEAR_SEL);
    let country = joined_anchor_text(&info, &COUNTRY_SEL);
    let genre = joined_anchor_text(&info, &GENRE_SEL);

    Some(FilmDetail {
        cover_url: Some(cover_url),
        rating,
        rating_count,
        actors,
        year,
        country,
        genre,
    })
}

/// Rating vote count: non-breaking spaces (and any other separators)
/// stripped, digits parsed.
fn parse_rating_count(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Joins the text of all matching anchors with ", ".
fn joined_anchor_text(scope: &scraper::ElementRef<'_>, selector: &Selector) -> Option<String> {
    let joined = scope
        .select(selector)
        .map(|a| a.text().collect::<String>().trim().to_owned())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() { None } else { Some(joined) }
}
