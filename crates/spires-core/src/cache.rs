//! Per-query disk cache and the last-results session slot.
//!
//! Every completed query gets one file under the storage directory, named by
//! a reversible URL-safe base64 encoding of the query text plus a `.cache`
//! suffix. Freshness is the file's own mtime: entries older than the window
//! (7 days by default) are treated as absent, as are unreadable ones. A
//! stale or corrupt entry is never an error, only a miss.
//!
//! The session slot is a single `lastresults.json` file holding the record
//! sequence of the most recent plain search, overwritten wholesale on every
//! resolution. It is the only way a later invocation can map a record id
//! back to a full record, so reading it has an explicit read-or-fail
//! contract ([`DiskCache::load_session`]) instead of a silent default.
//!
//! Writes go through a tempfile-and-rename so an interrupted invocation
//! never leaves a half-written entry behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use thiserror::Error;

use crate::record::Record;

/// Age beyond which a cache entry is treated as absent: 7 days.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const SESSION_FILE: &str = "lastresults.json";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("no stored results from a previous search")]
    MissingSession,
    #[error("stored results are unreadable: {0}")]
    UnreadableSession(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Handle on the two durable stores shared across invocations.
#[derive(Debug, Clone)]
pub struct DiskCache {
    /// Per-query entries (long-lived).
    storage_dir: PathBuf,
    /// The last-results slot (volatile, one file).
    session_dir: PathBuf,
    freshness: Duration,
}

impl DiskCache {
    pub fn new(storage_dir: impl Into<PathBuf>, session_dir: impl Into<PathBuf>) -> Self {
        Self::with_freshness(storage_dir, session_dir, DEFAULT_FRESHNESS)
    }

    /// Like [`DiskCache::new`] with a custom freshness window.
    pub fn with_freshness(
        storage_dir: impl Into<PathBuf>,
        session_dir: impl Into<PathBuf>,
        freshness: Duration,
    ) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            session_dir: session_dir.into(),
            freshness,
        }
    }

    /// Filesystem-safe, reversible encoding of a query string.
    pub fn encode_key(query: &str) -> String {
        URL_SAFE.encode(query.as_bytes())
    }

    /// Recover the query text from an encoded key.
    pub fn decode_key(key: &str) -> Option<String> {
        let bytes = URL_SAFE.decode(key).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn entry_path(&self, query: &str) -> PathBuf {
        self.storage_dir
            .join(format!("{}.cache", Self::encode_key(query)))
    }

    fn session_path(&self) -> PathBuf {
        self.session_dir.join(SESSION_FILE)
    }

    /// Load a fresh cache entry. Absent, stale or unreadable entries are all
    /// misses.
    pub fn load(&self, query: &str) -> Option<Vec<Record>> {
        let path = self.entry_path(query);
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        if age > self.freshness {
            tracing::debug!(query, age_secs = age.as_secs(), "cache entry stale");
            return None;
        }

        let bytes = std::fs::read(&path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(records) => {
                tracing::debug!(query, "cache hit");
                Some(records)
            }
            Err(e) => {
                tracing::debug!(query, error = %e, "cache entry unreadable, treating as miss");
                None
            }
        }
    }

    /// Overwrite the entry for `query` with `records`.
    pub fn store(&self, query: &str, records: &[Record]) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.storage_dir)?;
        write_atomic(&self.entry_path(query), &serde_json::to_vec(records)?)?;
        Ok(())
    }

    /// Overwrite the last-results slot with `records`.
    pub fn store_session(&self, records: &[Record]) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.session_dir)?;
        write_atomic(&self.session_path(), &serde_json::to_vec(records)?)?;
        Ok(())
    }

    /// Read the last-results slot. Unlike [`DiskCache::load`] this fails
    /// explicitly: a context-menu invocation without a prior search is a
    /// usage error, not a miss.
    pub fn load_session(&self) -> Result<Vec<Record>, CacheError> {
        let path = self.session_path();
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CacheError::MissingSession,
            _ => CacheError::UnreadableSession(e.to_string()),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| CacheError::UnreadableSession(e.to_string()))
    }
}

/// Write `bytes` to `path` via a tempfile in the same directory + rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
