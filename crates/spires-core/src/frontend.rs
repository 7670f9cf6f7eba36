//! Top-level dispatch: decode the input once, run one builder, and always
//! hand the launcher at least one entry.

use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::cache::DiskCache;
use crate::menu::{self, Entry};
use crate::navigation::{self, Navigation};
use crate::resolver::QueryResolver;
use crate::source::RecordSource;

pub struct Frontend {
    resolver: QueryResolver,
    cache: DiskCache,
    uid_base: String,
}

impl Frontend {
    pub fn new(
        cache: DiskCache,
        source: Arc<dyn RecordSource>,
        site_url: impl Into<String>,
        timeout: Duration,
        uid_base: impl Into<String>,
    ) -> Self {
        Self {
            resolver: QueryResolver::new(cache.clone(), source, site_url, timeout),
            cache,
            uid_base: uid_base.into(),
        }
    }

    /// Answer one invocation. Errors become a single diagnostic entry; the
    /// returned list is never empty.
    pub async fn respond(&self, input: &str) -> Vec<Entry> {
        let entries = match self.dispatch(input.trim()).await {
            Ok(entries) if entries.is_empty() => Err(Error::EmptyMenu),
            other => other,
        };
        entries.unwrap_or_else(|err| {
            tracing::error!(error = %err, "invocation failed");
            vec![menu::error_entry(&err)]
        })
    }

    async fn dispatch(&self, input: &str) -> Result<Vec<Entry>, Error> {
        match navigation::decode(input)? {
            Navigation::ClearCache => Ok(vec![menu::clear_cache_entry()]),
            Navigation::Search(query) => self.resolver.resolve(&query).await,
            Navigation::ContextMenu { id } => {
                let records = self.cache.load_session()?;
                let record = records
                    .iter()
                    .find(|r| r.id() == id)
                    .ok_or_else(|| Error::UnknownRecord(id.clone()))?;
                Ok(menu::context_menu(record, input, &self.uid_base))
            }
            Navigation::AuthorMenu { authors } => Ok(menu::author_menu(&authors)),
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
    year = "1998"
}
"#;

    fn frontend(dir: &tempfile::TempDir, source: Arc<MockSource>) -> Frontend {
        let cache = DiskCache::new(dir.path().join("storage"), dir.path().join("session"));
        Frontend::new(
            cache,
            source,
            "https://inspirehep.net",
            Duration::from_secs(5),
            "test-invocation.",
        )
    }

    #[tokio::test]
    async fn clearcache_returns_confirmation_without_touching_stores() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let fe = frontend(&dir, source.clone());

        let entries = fe.respond("clearcache").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Clear INSPIRE cache");
        assert_eq!(source.call_count(), 0);
        assert!(!dir.path().join("storage").exists());
        assert!(!dir.path().join("session").exists());
    }

    #[tokio::test]
    async fn context_menu_without_prior_search_is_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let fe = frontend(&dir, source);

        let entries = fe.respond("Maldacena:1997re \u{25BA}").await;
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].valid);
        assert!(entries[0].subtitle.contains("previous search"));
    }

    #[tokio::test]
    async fn context_menu_for_unknown_id_is_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let fe = frontend(&dir, source);

        fe.respond("find a maldacena.").await;
        let entries = fe.respond("Nobody:2000xy \u{25BA}").await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].subtitle.contains("Nobody:2000xy"));
    }

    #[tokio::test]
    async fn search_then_context_menu_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let fe = frontend(&dir, source);

        let rows = fe.respond("find a maldacena.").await;
        assert_eq!(rows.len(), 1);
        let autocomplete = rows[0].autocomplete.clone().unwrap();

        let menu = fe.respond(&autocomplete).await;
        assert_eq!(menu.len(), 5);
        assert!(menu[0].title.contains("Large N limit"));
    }

    #[tokio::test]
    async fn too_many_markers_is_a_diagnostic_not_a_crash() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MockSource::new(MockResponse::Markup(MARKUP.to_string())));
        let fe = frontend(&dir, source);

        let entries = fe.respond("a \u{25BA} b \u{25BA} c \u{25BA}").await;
        assert_eq!(entries.len(), 1);
        assert!(entries[0].subtitle.contains("markers"));
    }
}
