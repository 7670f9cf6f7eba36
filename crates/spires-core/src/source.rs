//! Remote record source: the fetch collaborator behind the query resolver.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Base URL of the INSPIRE service.
pub const DEFAULT_SITE_URL: &str = "https://inspirehep.net";

/// How many records a single search may return.
pub const DEFAULT_MAX_RESULTS: usize = 25;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
}

/// A remote service that answers a search query with raw BibTeX markup.
pub trait RecordSource: Send + Sync {
    /// The canonical name of this source (e.g., "INSPIRE").
    fn name(&self) -> &str;

    /// Fetch the bibliography markup for `query`.
    fn fetch<'a>(
        &'a self,
        query: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>>;
}

/// The INSPIRE literature API, asked for BibTeX output directly.
pub struct InspireSource {
    site_url: String,
    max_results: usize,
}

impl InspireSource {
    pub fn new(site_url: impl Into<String>, max_results: usize) -> Self {
        Self {
            site_url: site_url.into(),
            max_results,
        }
    }
}

impl Default for InspireSource {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL, DEFAULT_MAX_RESULTS)
    }
}

impl RecordSource for InspireSource {
    fn name(&self) -> &str {
        "INSPIRE"
    }

    fn fetch<'a>(
        &'a self,
        query: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!(
                "{}/api/literature?sort=mostrecent&size={}&format=bibtex&q={}",
                self.site_url,
                self.max_results,
                urlencoding::encode(query)
            );
            tracing::debug!(%url, "querying INSPIRE");

            let resp = client
                .get(&url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| SourceError::Http(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(SourceError::Status(resp.status().as_u16()));
            }

            resp.text().await.map_err(|e| SourceError::Http(e.to_string()))
        })
    }
}

/// A configurable response for [`MockSource`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful fetch returning this markup.
    Markup(String),
    /// Simulate a transport failure.
    Error(String),
}

/// A hand-rolled mock implementing [`RecordSource`] for tests.
///
/// Returns responses in sequence (repeating the last when exhausted) and
/// counts calls via [`call_count()`](MockSource::call_count).
pub struct MockSource {
    responses: std::sync::Mutex<Vec<MockResponse>>,
    fallback: MockResponse,
    call_count: std::sync::atomic::AtomicUsize,
}

impl MockSource {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: std::sync::Mutex::new(Vec::new()),
            fallback: response,
            call_count: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        responses.reverse();
        let fallback = responses.first().cloned().unwrap();
        Self {
            responses: std::sync::Mutex::new(responses),
            fallback,
            call_count: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// How many times `fetch()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl RecordSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch<'a>(
        &'a self,
        _query: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, SourceError>> + Send + 'a>> {
        self.call_count
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let response = self.next_response();

        Box::pin(async move {
            match response {
                MockResponse::Markup(markup) => Ok(markup),
                MockResponse::Error(msg) => Err(SourceError::Http(msg)),
            }
        })
    }
}
