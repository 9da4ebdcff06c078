//! `KinopoiskClient` - detail-lookup client implementation.

use anyhow::{Context, Result};
use tracing::instrument;
use url::Url;

use super::api::LocalDetailApi;
use super::parser::parse_film_page;
use crate::fetch::PageFetcher;
use crate::types::FilmDetail;

/// Title search endpoint; with `first=yes` the site redirects straight
/// to the best-matching film page.
pub const KINOPOISK_SEARCH_URL: &str = "https://www.kinopoisk.ru/index.php";

/// Detail-lookup client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct KinopoiskClient {
    /// Cached page fetcher.
    fetcher: PageFetcher,
    /// Search endpoint URL.
    base_url: Url,
}

/// Builder for `KinopoiskClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct KinopoiskClientBuilder {
    fetcher: Option<PageFetcher>,
    base_url: Option<Url>,
}

impl KinopoiskClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            fetcher: None,
            base_url: None,
        }
    }

    /// Sets the page fetcher (required).
    #[must_use]
    pub fn fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Overrides the search endpoint URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `fetcher` is not set.
    /// - The default search URL fails to parse.
    pub fn build(self) -> Result<KinopoiskClient> {
        let fetcher = self.fetcher.context("fetcher is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(KINOPOISK_SEARCH_URL);
            result.context("invalid default search URL")?
        };

        Ok(KinopoiskClient { fetcher, base_url })
    }
}

impl KinopoiskClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> KinopoiskClientBuilder {
        KinopoiskClientBuilder::new()
    }
}

impl LocalDetailApi for KinopoiskClient {
    #[instrument(skip_all, fields(%title))]
    async fn film_details(&self, title: &str) -> Result<FilmDetail> {
        let params = [("kp_query", title), ("first", "yes"), ("what", "")];

        let page = self
            .fetcher
            .fetch(&self.base_url, &params)
            .await
            .with_context(|| format!("detail lookup for {title:?} failed"))?;

        let detail = parse_film_page(&page.body);
        tracing::debug!(status = page.status, rating = detail.rating, "film page parsed");
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use kinotop_cache::PageCache;

    use super::*;

    fn fetcher_in(dir: &tempfile::TempDir) -> PageFetcher {
        let cache = PageCache::builder().dir(dir.path()).build().unwrap();
        PageFetcher::new(Arc::new(cache)).unwrap()
    }

    #[test]
    fn test_builder_requires_fetcher() {
        // Arrange & Act
        let result = KinopoiskClient::builder().build();

        // Assert
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("fetcher is required")
        );
    }

    #[tokio::test]
    async fn test_film_details_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html = include_str!("../../../../fixtures/kinopoisk/film_full.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/index.php"))
            .and(wiremock::matchers::query_param(
                "kp_query",
                "Мстители: Война бесконечности",
            ))
            .and(wiremock::matchers::query_param("first", "yes"))
            .and(wiremock::matchers::query_param("what", ""))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/index.php", mock_server.uri());
        let client = KinopoiskClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap();

        // Act
        let detail = client
            .film_details("Мстители: Война бесконечности")
            .await
            .unwrap();

        // Assert
        assert!((detail.rating - 8.1).abs() < f64::EPSILON);
        assert_eq!(detail.rating_count, 1_234_567);
        assert_eq!(detail.year.as_deref(), Some("2018"));
    }

    #[tokio::test]
    async fn test_unparsable_page_yields_defaults_not_error() {
        // Arrange: the search endpoint answers with a disambiguation list
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<html><body><ul class=\"search\"></ul></body></html>"),
            )
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/index.php", mock_server.uri());
        let client = KinopoiskClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap();

        // Act
        let detail = client.film_details("Неоднозначный").await.unwrap();

        // Assert
        assert_eq!(detail, FilmDetail::default());
    }

    #[tokio::test]
    async fn test_repeat_lookup_hits_the_cache() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html = include_str!("../../../../fixtures/kinopoisk/film_full.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/index.php", mock_server.uri());
        let client = KinopoiskClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap();

        // Act
        let first = client.film_details("Мстители").await.unwrap();
        let second = client.film_details("Мстители").await.unwrap();

        // Assert: mock expect(1) verifies the cache hit
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // Arrange: nothing listens on this port
        let dir = tempfile::tempdir().unwrap();
        let client = KinopoiskClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url("http://127.0.0.1:1/index.php".parse().unwrap())
            .build()
            .unwrap();

        // Act
        let result = client.film_details("Фильм").await;

        // Assert
        assert!(result.is_err());
    }
}
