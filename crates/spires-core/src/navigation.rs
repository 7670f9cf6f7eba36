//! Input classification: one decode step at the boundary.
//!
//! The launcher re-invokes the binary on every keystroke with the full input
//! string; the only state the string itself carries is the count of the
//! reserved marker character. Zero markers is a plain search, one marker is
//! an item context menu (the id precedes the marker), two markers is an
//! author-disambiguation menu (the author list sits between them). The
//! builders never emit more than two markers, so any higher count means the
//! input was not produced by this program and is rejected loudly.

use thiserror::Error;

use crate::record::AUTHOR_SEPARATOR;

/// Reserved marker character. Must not appear in query text or record ids.
pub const MARKER: char = '►';

/// The literal input that bypasses classification entirely.
pub const CLEAR_CACHE_COMMAND: &str = "clearcache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// No markers: the whole input is a search string.
    Search(String),
    /// One marker: `id` is the trimmed text before it.
    ContextMenu { id: String },
    /// Two markers: the trimmed text between them, split into author names.
    AuthorMenu { authors: Vec<String> },
    /// The literal `clearcache` command.
    ClearCache,
}

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("input contains {0} navigation markers, at most 2 are meaningful")]
    MarkerCount(usize),
}

/// Classify a trimmed input string.
pub fn decode(input: &str) -> Result<Navigation, NavigationError> {
    let input = input.trim();
    if input == CLEAR_CACHE_COMMAND {
        return Ok(Navigation::ClearCache);
    }

    let markers = input.chars().filter(|&c| c == MARKER).count();
    match markers {
        0 => Ok(Navigation::Search(input.to_string())),
        1 => {
            let id = input
                .split(MARKER)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Ok(Navigation::ContextMenu { id })
        }
        2 => {
            let between = input.split(MARKER).nth(1).unwrap_or_default().trim();
            let authors = between
                .split(AUTHOR_SEPARATOR)
                .map(|name| name.trim().to_string())
                .collect();
            Ok(Navigation::AuthorMenu { authors })
        }
        n => Err(NavigationError::MarkerCount(n)),
    }
}
