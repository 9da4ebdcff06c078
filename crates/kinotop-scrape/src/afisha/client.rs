//! `AfishaClient` - schedule-listing client implementation.

use anyhow::{Context, Result};
use tracing::instrument;
use url::Url;

use super::api::LocalScheduleApi;
use super::parser::{DEFAULT_MIN_VENUE_COUNT, parse_schedule};
use crate::fetch::PageFetcher;
use crate::types::FilmCandidate;

/// Moscow cinema schedule page.
pub const AFISHA_SCHEDULE_URL: &str = "https://www.afisha.ru/msk/schedule_cinema/";

/// Schedule-listing client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AfishaClient {
    /// Cached page fetcher.
    fetcher: PageFetcher,
    /// Schedule page URL.
    base_url: Url,
    /// Venue-count threshold (strict).
    min_venue_count: usize,
}

/// Builder for `AfishaClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct AfishaClientBuilder {
    fetcher: Option<PageFetcher>,
    base_url: Option<Url>,
    min_venue_count: Option<usize>,
}

impl AfishaClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            fetcher: None,
            base_url: None,
            min_venue_count: None,
        }
    }

    /// Sets the page fetcher (required).
    #[must_use]
    pub fn fetcher(mut self, fetcher: PageFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Overrides the schedule page URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the venue-count threshold (default: 30, strict).
    #[must_use]
    pub const fn min_venue_count(mut self, count: usize) -> Self {
        self.min_venue_count = Some(count);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `fetcher` is not set.
    /// - The default schedule URL fails to parse.
    pub fn build(self) -> Result<AfishaClient> {
        let fetcher = self.fetcher.context("fetcher is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(AFISHA_SCHEDULE_URL);
            result.context("invalid default schedule URL")?
        };

        Ok(AfishaClient {
            fetcher,
            base_url,
            min_venue_count: self.min_venue_count.unwrap_or(DEFAULT_MIN_VENUE_COUNT),
        })
    }
}

impl AfishaClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> AfishaClientBuilder {
        AfishaClientBuilder::new()
    }
}

impl LocalScheduleApi for AfishaClient {
    #[instrument(skip_all)]
    async fn current_films(&self) -> Result<Vec<FilmCandidate>> {
        let page = self
            .fetcher
            .fetch(&self.base_url, &[])
            .await
            .context("failed to fetch the schedule page")?;

        let films = parse_schedule(&page.body, self.min_venue_count);
        tracing::debug!(
            status = page.status,
            films = films.len(),
            "schedule page parsed"
        );
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

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
        let result = AfishaClient::builder().build();

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
    async fn test_current_films_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html = include_str!("../../../../fixtures/afisha/schedule.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/msk/schedule_cinema/"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/msk/schedule_cinema/", mock_server.uri());
        let client = AfishaClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap();

        // Act
        let films = client.current_films().await.unwrap();

        // Assert
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].title, "Мстители: Война бесконечности");
        assert_eq!(films[1].title, "Собибор");
    }

    #[tokio::test]
    async fn test_schedule_page_is_fetched_once_within_ttl() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html = include_str!("../../../../fixtures/afisha/schedule.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/msk/schedule_cinema/", mock_server.uri());
        let client = AfishaClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .build()
            .unwrap();

        // Act
        let first = client.current_films().await.unwrap();
        let second = client.current_films().await.unwrap();

        // Assert: mock expect(1) verifies the cache hit
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_custom_threshold_is_applied() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let html = include_str!("../../../../fixtures/afisha/schedule.html");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base_url = format!("{}/msk/schedule_cinema/", mock_server.uri());
        let client = AfishaClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url(base_url.parse().unwrap())
            .min_venue_count(10)
            .build()
            .unwrap();

        // Act
        let films = client.current_films().await.unwrap();

        // Assert: the 12-venue film passes a threshold of 10
        assert_eq!(films.len(), 3);
        assert_eq!(films[2].venue_count, 12);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        // Arrange: nothing listens on this port
        let dir = tempfile::tempdir().unwrap();
        let client = AfishaClient::builder()
            .fetcher(fetcher_in(&dir))
            .base_url("http://127.0.0.1:1/".parse().unwrap())
            .build()
            .unwrap();

        // Act
        let result = client.current_films().await;

        // Assert
        assert!(result.is_err());
    }
}
