//! Display formatting for records: author abbreviation, journal summaries
//! and BibTeX serialization.

use crate::record::{AUTHOR_SEPARATOR, Record};

/// Reduce a full author list to an Oxford-comma list of last names.
///
/// Input names are `"Lastname, Firstname"` style; everything before the
/// first comma is kept.
pub fn abbreviate_authors(authors: &str) -> String {
    let last_names: Vec<&str> = authors.split(AUTHOR_SEPARATOR).map(last_name).collect();
    match last_names.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., tail] => format!("{}, and {}", init.join(", "), tail),
    }
}

fn last_name(name: &str) -> &str {
    match name.split_once(',') {
        Some((last, _)) => last.trim(),
        None => name.trim(),
    }
}

/// `"Journal volume p.pages"`, falling back to the DOI, falling back to "".
///
/// Volume is only appended when present; pages only when the volume is too.
pub fn journal_summary(record: &Record) -> String {
    let Some(journal) = record.get("journal") else {
        return record.get("doi").unwrap_or_default().to_string();
    };
    let mut text = journal.to_string();
    if let Some(volume) = record.get("volume") {
        text.push(' ');
        text.push_str(volume);
        if let Some(pages) = record.get("pages") {
            text.push_str(" p.");
            text.push_str(pages);
        }
    }
    text
}

/// Serialize a record back to a BibTeX entry.
///
/// Fields are emitted in the record's stored order with every `=` aligned to
/// the widest field name (including `id` and `type`, which are not emitted
/// as lines themselves). The title value is additionally brace-wrapped.
pub fn to_bibtex(record: &Record) -> String {
    let width = record
        .fields()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "@{}{{{},\n",
        record.get("type").unwrap_or("article"),
        record.id()
    );
    for (name, value) in record.fields() {
        if name == "type" || name == "id" {
            continue;
        }
        out.push_str("      ");
        out.push_str(name);
        for _ in name.len()..width {
            out.push(' ');
        }
        out.push_str(" = ");
        if name == "title" {
            out.push_str(&format!("\"{{{}}}\"", value));
        } else {
            out.push_str(&format!("\"{}\"", value));
        }
        out.push_str(",\n");
    }
    out.push('}');
    out
}
