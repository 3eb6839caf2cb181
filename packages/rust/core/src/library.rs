//! Personal library maintenance: listing, removing and clearing saved books.

use bookadvisor_shared::{BookAdvisorError, BookRecord, Result};
use bookadvisor_storage::{RecordSink, RecordStore};
use tracing::{info, instrument};

/// Render one library entry the way `list` shows it. `position` is 1-based.
pub fn describe_entry(position: usize, record: &BookRecord) -> String {
    let cover = match record.cover_url() {
        Some(url) if url.starts_with("http") => url,
        _ => "Empty",
    };
    let description = if record.description().is_empty() {
        "N/A"
    } else {
        record.description()
    };

    format!(
        "{position}. {} - {} ({})\n   Cover: {cover}\n   Description: {description}",
        record.title(),
        record.author(),
        record.publish_date(),
    )
}

/// Remove the entry at 0-based `index` and write the remainder through `sink`.
///
/// Returns the removed record. An out-of-range index leaves the library
/// untouched.
#[instrument(skip_all, fields(index = index))]
pub fn remove_at(store: &RecordStore, sink: &dyn RecordSink, index: usize) -> Result<BookRecord> {
    let mut records = store.load_all();
    if index >= records.len() {
        return Err(BookAdvisorError::validation(format!(
            "invalid choice: {} (library has {} book(s))",
            index + 1,
            records.len()
        )));
    }

    let removed = records.remove(index);
    sink.save_all(&records)?;
    info!(title = removed.title(), remaining = records.len(), "book removed");
    Ok(removed)
}

/// Empty the library.
pub fn clear(sink: &dyn RecordSink) -> Result<()> {
    sink.save_all(&[])?;
    info!(sink = sink.name(), "library cleared");
    Ok(())
}
