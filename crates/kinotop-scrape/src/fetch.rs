//! `PageFetcher` - HTTP GET with browser-like headers and a shared
//! persistent response cache.

use std::sync::Arc;

use anyhow::{Context, Result};
use kinotop_cache::{CachedPage, PageCache};
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::instrument;
use url::Url;

/// Fixed browser User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/64.0.3282.140 Safari/537.36";

/// Accept-Language header value, preferring Russian.
const ACCEPT_LANGUAGE_RU: &str = "ru,en;q=0.9";

/// Builds the cache key for a request: the URL plus a canonical
/// (sorted) serialization of its query parameters, so logically
/// identical requests share a key regardless of parameter order.
#[must_use]
pub fn cache_key(url: &Url, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return url.as_str().to_owned();
    }

    let mut pairs = params.to_vec();
    pairs.sort_unstable();
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}?{query}")
}

/// Cached HTTP page fetcher.
///
/// Cheap to clone; clones share the underlying connection pool and
/// cache.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// HTTP client (browser UA, Russian Accept-Language, gzip).
    http_client: Client,
    /// Shared page cache.
    cache: Arc<PageCache>,
}

impl PageFetcher {
    /// Creates a fetcher backed by the given cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the `reqwest::Client` build fails.
    pub fn new(cache: Arc<PageCache>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_RU));

        let http_client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { http_client, cache })
    }

    /// Fetches a page, consulting the cache first and storing the raw
    /// response (regardless of HTTP status) on a miss.
    ///
    /// The check-then-set sequence is deliberately not serialized
    /// across callers: concurrent first requests for one key may each
    /// hit the network. Writes are whole-entry replacements, so the
    /// cached value is never torn.
    ///
    /// # Errors
    ///
    /// Returns an error if the network request fails. Cache failures
    /// are logged and do not fail the fetch.
    #[instrument(skip_all, fields(%url))]
    pub async fn fetch(&self, url: &Url, params: &[(&str, &str)]) -> Result<CachedPage> {
        let key = cache_key(url, params);

        match self.cache.get(&key).await {
            Ok(Some(page)) => {
                tracing::debug!(key, "page cache hit");
                return Ok(page);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, "page cache read failed, fetching"),
        }

        let mut request = self.http_client.get(url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body of {url}"))?;

        let page = CachedPage {
            status,
            headers,
            body,
        };

        if let Err(e) = self.cache.set(&key, &page).await {
            tracing::warn!(key, error = %e, "page cache write failed");
        }

        tracing::debug!(key, status, body_len = page.body.len(), "page fetched");
        Ok(page)
    }
}
