use thiserror::Error;

pub mod action;
pub mod cache;
pub mod config_file;
pub mod format;
pub mod frontend;
pub mod menu;
pub mod navigation;
pub mod record;
pub mod resolver;
pub mod source;

// Re-export for convenience
pub use action::{Action, ActionKind, Notification};
pub use cache::{DEFAULT_FRESHNESS, DiskCache};
pub use frontend::Frontend;
pub use menu::Entry;
pub use navigation::{MARKER, Navigation};
pub use record::Record;
pub use resolver::{DEFAULT_FETCH_TIMEOUT, QUERY_TERMINATOR, QueryResolver};
pub use source::{DEFAULT_MAX_RESULTS, DEFAULT_SITE_URL, InspireSource, RecordSource};

/// Anything that can go wrong answering one invocation. The frontend turns
/// every variant into a single visible diagnostic entry.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Navigation(#[from] navigation::NavigationError),
    #[error("remote search failed: {0}")]
    Source(#[from] source::SourceError),
    #[error("could not parse search results: {0}")]
    Parse(#[from] record::ParseError),
    #[error(transparent)]
    Cache(#[from] cache::CacheError),
    #[error("no record with id `{0}` in the last search results")]
    UnknownRecord(String),
    #[error("no menu entries produced for this input")]
    EmptyMenu,
}
