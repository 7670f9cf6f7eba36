//! Menu entry type and the three entry-list builders.
//!
//! Entries come in two flavors. A *terminal* entry carries an encoded
//! [`Action`] and ends the navigation sequence; a *non-terminal* entry only
//! supplies the next invocation's input via its autocomplete string (the
//! launcher marks it invalid so hitting enter completes instead of
//! executing). The context menu is faked on top of that: a search row's
//! autocomplete is `<id> ►`, which the next invocation decodes as
//! [`Navigation::ContextMenu`](crate::navigation::Navigation).

use serde::Serialize;

use crate::Error;
use crate::action::{Action, Notification};
use crate::format::{abbreviate_authors, journal_summary, to_bibtex};
use crate::navigation::MARKER;
use crate::record::{AUTHOR_SEPARATOR, Record};
use crate::resolver::QUERY_TERMINATOR;

/// One row of launcher feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub title: String,
    pub subtitle: String,
    /// Stable identity across repeated invocations, where one is needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Terminal entries are valid; non-terminal ones only autocomplete.
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    /// Encoded action payload (terminal entries only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
}

impl Entry {
    /// A terminal entry carrying an executable action.
    pub fn terminal(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        action: &Action,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            uid: None,
            valid: true,
            autocomplete: None,
            arg: Some(action.encode()),
        }
    }

    /// A non-terminal entry that feeds `autocomplete` back as the next input.
    pub fn prompt(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        autocomplete: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            uid: None,
            valid: false,
            autocomplete: Some(autocomplete.into()),
            arg: None,
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// Row for one record in the plain-search result list.
///
/// Selecting it re-enters the interface in context-menu mode for the
/// record's id; nothing is executed.
pub fn search_row(record: &Record) -> Entry {
    let mut subtitle = String::new();
    if let Some(year) = record.get("year") {
        subtitle.push_str(year);
        subtitle.push(' ');
    }
    subtitle.push_str(&abbreviate_authors(record.author()));
    let journal = journal_summary(record);
    if !journal.is_empty() {
        subtitle.push_str(" (");
        subtitle.push_str(&journal);
        subtitle.push(')');
    }

    Entry::prompt(
        record.title(),
        subtitle,
        format!("{} {}", record.id(), MARKER),
    )
}

/// Prompt shown while the query does not yet end in the terminator.
pub fn incomplete_entry(search: &str) -> Entry {
    Entry::prompt(
        format!("Search INSPIRE for '{}'", search),
        format!(
            "Hit enter or end the query with a full stop ({}) to search",
            QUERY_TERMINATOR
        ),
        format!("{}{}", search, QUERY_TERMINATOR),
    )
}

/// Fallback row for an empty result set: search the website instead.
pub fn no_results_entry(query: &str, site_url: &str) -> Entry {
    Entry::terminal(
        "No results",
        format!("Search on the INSPIRE website for {}.", query),
        &Action::url(format!(
            "{}/search?ln=en&p={}",
            site_url,
            urlencoding::encode(query)
        )),
    )
}

/// Diagnostic row for a failed invocation; the feedback list is never empty.
pub fn error_entry(error: &Error) -> Entry {
    Entry {
        title: "INSPIRE search failed".to_string(),
        subtitle: error.to_string(),
        uid: None,
        valid: false,
        autocomplete: None,
        arg: None,
    }
}

/// Confirmation entry for the `clearcache` command. Only the descriptor:
/// the deletion itself is the downstream executor's job.
pub fn clear_cache_entry() -> Entry {
    Entry::terminal(
        "Clear INSPIRE cache",
        "Do you want to clear all cached INSPIRE searches?",
        &Action::clear_cache(Notification {
            title: "Cache cleared".to_string(),
            text: "All saved INSPIRE results have been cleared".to_string(),
        }),
    )
}

/// Context menu for one record. `input` is the raw navigation input that
/// selected the record (needed to build the author-menu autocomplete);
/// `uid_base` is the per-invocation token entry uids derive from.
///
/// The order is fixed: record page, author(s), DOI (if any), eprint (if
/// any), references, citations, BibTeX.
pub fn context_menu(record: &Record, input: &str, uid_base: &str) -> Vec<Entry> {
    let id = record.id();
    let mut entries = Vec::with_capacity(7);

    entries.push(
        Entry::terminal(
            record.title(),
            "Open Inspire record page in browser",
            &Action::record_page(id),
        )
        .with_uid(format!("{uid_base}inspirerecord")),
    );

    entries.push(author_entry(record, input).with_uid(format!("{uid_base}authors")));

    if let Some(doi) = record.get("doi") {
        let title = match journal_summary(record) {
            summary if summary.is_empty() => doi.to_string(),
            summary => summary,
        };
        entries.push(
            Entry::terminal(
                title,
                "Open DOI in browser",
                &Action::url(format!("http://dx.doi.org/{}", doi)),
            )
            .with_uid(format!("{uid_base}doi")),
        );
    }

    if let Some(eprint) = record.get("eprint") {
        let (label, url_path) = eprint_label_and_path(record, eprint);
        entries.push(
            Entry::terminal(
                label,
                "Open PDF in browser",
                &Action::url(format!("http://arxiv.org/pdf/{}", url_path)),
            )
            .with_uid(format!("{uid_base}arxivpdf")),
        );
    }

    entries.push(
        Entry::prompt(
            "References",
            "Find papers that this paper cites",
            format!("citedby:{}{}", id, QUERY_TERMINATOR),
        )
        .with_uid(format!("{uid_base}refs")),
    );

    entries.push(
        Entry::prompt(
            "Citations",
            "Find papers that cite this paper",
            format!("refersto:{}{}", id, QUERY_TERMINATOR),
        )
        .with_uid(format!("{uid_base}cites")),
    );

    entries.push(
        Entry::terminal(
            "BibTeX",
            "Copy BibTeX to clipboard",
            &Action::clipboard(
                to_bibtex(record),
                Notification {
                    title: "Copied BibTeX to clipboard".to_string(),
                    text: format!("The BibTeX entry for {} to the clipboard", id),
                },
            ),
        )
        .with_uid(format!("{uid_base}bibtex")),
    );

    entries
}

/// A single author searches directly; several re-enter as an author menu.
fn author_entry(record: &Record, input: &str) -> Entry {
    let author = record.author();
    if author.contains(AUTHOR_SEPARATOR) {
        Entry::prompt(
            abbreviate_authors(author),
            "Find more papers of authors",
            format!("{} {} {}", input, author, MARKER),
        )
    } else {
        Entry::prompt(
            author,
            "Find more papers of author",
            format!("find a {}{}", author, QUERY_TERMINATOR),
        )
    }
}

/// An `eprint` without an `archiveprefix` is treated as arXiv.
fn eprint_label_and_path(record: &Record, eprint: &str) -> (String, String) {
    match record.get("archiveprefix") {
        Some(prefix) if prefix != "arXiv" => {
            (format!("{}/{}", prefix, eprint), format!("{}/{}", prefix, eprint))
        }
        _ => (format!("arXiv:{}", eprint), eprint.to_string()),
    }
}

/// One non-terminal entry per author, order preserved, no deduplication.
pub fn author_menu(authors: &[String]) -> Vec<Entry> {
    authors
        .iter()
        .map(|name| {
            Entry::prompt(
                name,
                "Find more papers of author",
                format!("find a {}{}", name, QUERY_TERMINATOR),
            )
        })
        .collect()
}
