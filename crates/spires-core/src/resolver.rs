//! Query resolution: terminator handling, cache lookup, remote fetch.
//!
//! A search string is only *executed* once it ends in the terminator
//! character; anything shorter produces a single prompt entry and touches
//! neither the cache nor the network. A completed query is answered from the
//! per-query cache when a fresh entry exists, otherwise fetched remotely
//! (one retry on transport failure), parsed and written back. Either way the
//! last-results slot is overwritten with exactly the record sequence being
//! shown, so the next invocation can resolve a context-menu id against it.

use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::cache::DiskCache;
use crate::menu::{self, Entry};
use crate::record;
use crate::source::{RecordSource, SourceError};

/// Trailing character that marks a query as complete.
pub const QUERY_TERMINATOR: char = '.';

/// Default per-request timeout for the remote fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub struct QueryResolver {
    cache: DiskCache,
    source: Arc<dyn RecordSource>,
    client: reqwest::Client,
    timeout: Duration,
    site_url: String,
}

impl QueryResolver {
    pub fn new(
        cache: DiskCache,
        source: Arc<dyn RecordSource>,
        site_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            client: reqwest::Client::new(),
            timeout,
            site_url: site_url.into(),
        }
    }

    /// Resolve a raw search string into the plain-search entry list.
    pub async fn resolve(&self, search: &str) -> Result<Vec<Entry>, Error> {
        let Some(query) = search.strip_suffix(QUERY_TERMINATOR) else {
            return Ok(vec![menu::incomplete_entry(search)]);
        };

        let records = match self.cache.load(query) {
            Some(records) => records,
            None => {
                let markup = self.fetch_with_retry(query).await?;
                let records = record::parse_records(&markup)?;
                if let Err(e) = self.cache.store(query, &records) {
                    tracing::warn!(query, error = %e, "failed to write cache entry");
                }
                records
            }
        };

        // Overwritten on every resolution, hit or miss: the slot always
        // mirrors what the user currently sees.
        if let Err(e) = self.cache.store_session(&records) {
            tracing::warn!(error = %e, "failed to write last-results slot");
        }

        if records.is_empty() {
            return Ok(vec![menu::no_results_entry(query, &self.site_url)]);
        }
        Ok(records.iter().map(menu::search_row).collect())
    }

    async fn fetch_with_retry(&self, query: &str) -> Result<String, SourceError> {
        match self.source.fetch(query, &self.client, self.timeout).await {
            Ok(markup) => Ok(markup),
            Err(first) => {
                tracing::warn!(
                    source = self.source.name(),
                    error = %first,
                    "fetch failed, retrying once"
                );
                self.source
                    .fetch(query, &self.client, self.timeout)
                    .await
                    .inspect_err(|second| {
                        tracing::error!(source = self.source.name(), error = %second, "retry failed");
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockResponse, MockSource};

    const MARKUP: &str = r#"
@article{Maldacena:1997re,
    author = "Maldacena, Juan Martin",
    title = "{The Large N limit of superconformal field theories and supergravity}",
    journal = "Adv. Theor. Math. Phys.",
    volume = "2",
    pages = "231--252",
    year = "1998"
}
@article{Witten:1998qj,
    author = "Witten, Edward",
    title = "{Anti-de Sitter space and holography}",
    year = "1998"
}
"#;

    fn resolver_with(
        dir: &tempfile::TempDir,
        source: Arc<MockSource>,
        freshness: Duration,
    ) -> QueryResolver {
        let cache = DiskCache::with_freshness(
            dir.path().join("storage"),
            dir.path().join("session"),
            freshness,
        );
        QueryResolver::new(
            cache,
            source,
            "https://inspirehep.net",
            DEFAULT_FETCH_TIMEOUT,
        )
    }

    #[tokio::test]
    async fn incomplete_query_prompts_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let entries = resolver.resolve("find a maldacena").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].valid);
        assert_eq!(
            entries[0].autocomplete.as_deref(),
            Some("find a maldacena.")
        );

        assert_eq!(source.call_count(), 0);
        assert!(!dir.path().join("storage").exists());
        assert!(!dir.path().join("session").exists());
    }

    #[tokio::test]
    async fn completed_query_fetches_and_lists_rows() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let entries = resolver.resolve("find a maldacena.").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(source.call_count(), 1);
        assert_eq!(
            entries[0].autocomplete.as_deref(),
            Some("Maldacena:1997re \u{25BA}")
        );
    }

    #[tokio::test]
    async fn repeated_query_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let first = resolver.resolve("find a maldacena.").await.unwrap();
        let second = resolver.resolve("find a maldacena.").await.unwrap();
        assert_eq!(source.call_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn stale_cache_entry_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_millis(1));

        resolver.resolve("find a maldacena.").await.unwrap();
        std::thread::sleep(Duration::from_millis(20));
        resolver.resolve("find a maldacena.").await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn slot_is_overwritten_on_cache_hit_too() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));
        let cache = DiskCache::new(dir.path().join("storage"), dir.path().join("session"));

        resolver.resolve("find a maldacena.").await.unwrap();
        let slot = cache.load_session().unwrap();
        assert_eq!(slot.len(), 2);

        // Remove the slot, resolve again (cache hit): the slot comes back.
        std::fs::remove_file(dir.path().join("session").join("lastresults.json")).unwrap();
        resolver.resolve("find a maldacena.").await.unwrap();
        assert_eq!(source.call_count(), 1);
        assert_eq!(cache.load_session().unwrap(), slot);
    }

    #[tokio::test]
    async fn transient_fetch_failure_is_retried_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::with_sequence(vec![
            MockResponse::Error("connection reset".to_string()),
            MockResponse::Markup(MARKUP.to_string()),
        ]));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let entries = resolver.resolve("find a maldacena.").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn persistent_fetch_failure_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Error("boom".to_string())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let err = resolver.resolve("find a maldacena.").await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn unparseable_markup_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(
            "@article{broken".to_string(),
        )));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let err = resolver.resolve("q.").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn empty_result_set_falls_back_to_site_search() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(String::new())));
        let resolver = resolver_with(&dir, source.clone(), Duration::from_secs(3600));

        let entries = resolver.resolve("find a nobody.").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "No results");
        assert!(entries[0].valid);
    }
}
