use std::io::Write;

use serde::Serialize;
use spires_core::Entry;

/// The feedback document the launcher reads from stdout.
#[derive(Serialize)]
struct Feedback<'a> {
    items: &'a [Entry],
}

/// Write the entries as a single JSON document.
pub fn write_feedback(w: &mut dyn Write, entries: &[Entry]) -> std::io::Result<()> {
    serde_json::to_writer(&mut *w, &Feedback { items: entries })
        .map_err(std::io::Error::other)?;
    writeln!(w)
}
