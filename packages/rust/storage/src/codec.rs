//! Line codec for the library file.
//!
//! Canonical layout, one record per line:
//!
//! ```text
//! title||author||cover_url||publish_date||description
//! ```
//!
//! Older files may carry a sixth field, the catalog key, between
//! `publish_date` and `description`; those lines are still read.
//!
//! Line breaks inside a field are folded into a single space on write.
//! There is no escaping: a field that contains `||`, or that starts or ends
//! with `|`, produces a line that splits differently on read. Such records
//! are still written, with a warning.

use bookadvisor_shared::{BookRecord, single_line};
use tracing::warn;

/// Field separator.
pub const DELIMITER: &str = "||";

/// Cover placeholder written by older versions for a missing cover.
const LEGACY_NULL: &str = "null";

/// Encode a record as one line (without the trailing newline).
///
/// Line breaks are folded into spaces. A field that would break the framing
/// (see [`breaks_framing`]) is written as-is and will not survive a round
/// trip; a warning is logged.
pub fn serialize(record: &BookRecord) -> String {
    let fields = [
        record.title(),
        record.author(),
        record.cover_url().unwrap_or(""),
        record.publish_date(),
        record.description(),
    ]
    .map(single_line);

    if fields.iter().any(|f| breaks_framing(f)) {
        warn!(title = record.title(), "record field clashes with the delimiter; line will not round-trip");
    }

    fields.join(DELIMITER)
}

/// Whether `field` cannot be placed between delimiters unambiguously.
///
/// Besides an embedded `||`, a leading or trailing `|` merges with the
/// neighbouring delimiter into a run of three pipes.
pub fn breaks_framing(field: &str) -> bool {
    field.contains(DELIMITER) || field.starts_with('|') || field.ends_with('|')
}

/// Decode one line. Never fails: missing trailing fields become `""`.
pub fn deserialize(line: &str) -> BookRecord {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    let field = |i: usize| parts.get(i).copied().unwrap_or("");

    let (key, description) = if parts.len() >= 6 {
        (field(4), field(5))
    } else {
        ("", field(4))
    };

    let cover = field(2);
    let cover_url = (!cover.is_empty() && cover != LEGACY_NULL).then(|| cover.to_string());

    BookRecord::builder()
        .title(field(0))
        .author(field(1))
        .cover_url(cover_url)
        .publish_date(field(3))
        .key(key)
        .description(description)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookRecord {
        BookRecord::builder()
            .title("Java 101")
            .author("Mario Rossi")
            .cover_url(Some("cover.jpg".into()))
            .publish_date("2020")
            .description("A beginner's guide...")
            .build()
    }

    #[test]
    fn serialize_field_order() {
        assert_eq!(
            serialize(&sample()),
            "Java 101||Mario Rossi||cover.jpg||2020||A beginner's guide..."
        );
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let record = sample();
        assert_eq!(deserialize(&serialize(&record)), record);
    }

    #[test]
    fn missing_cover_written_as_empty_field() {
        let record = BookRecord::builder().title("No Cover").author("Anon").build();
        let line = serialize(&record);
        assert_eq!(line, "No Cover||Anon||||N/A||");
        assert_eq!(deserialize(&line), record);
    }

    #[test]
    fn short_line_defaults_to_empty_fields() {
        let record = deserialize("Only Title");
        assert_eq!(record.title(), "Only Title");
        assert_eq!(record.author(), "");
        assert_eq!(record.cover_url(), None);
        assert_eq!(record.publish_date(), "");
        assert_eq!(record.description(), "");
    }

    #[test]
    fn legacy_null_cover_reads_as_none() {
        let record = deserialize("Dune||Frank Herbert||null||1965||Spice.");
        assert_eq!(record.cover_url(), None);
        assert_eq!(record.description(), "Spice.");
    }

    #[test]
    fn legacy_six_field_line_restores_key() {
        let record = deserialize("Dune||Frank Herbert||null||1965||/works/OL893415W||Spice.");
        assert_eq!(record.key(), "/works/OL893415W");
        assert_eq!(record.description(), "Spice.");
        assert_eq!(record.publish_date(), "1965");
    }

    #[test]
    fn line_breaks_are_folded_on_write() {
        let record = BookRecord::builder()
            .title("Hobbit")
            .author("Tolkien")
            .description("Para one.\r\n\r\nPara two.")
            .build();

        let line = serialize(&record);

        assert!(!line.contains(['\r', '\n']));
        let restored = deserialize(&line);
        assert_eq!(restored.title(), "Hobbit");
        assert_eq!(restored.description(), "Para one. Para two.");
    }

    #[test]
    fn edge_pipes_break_framing() {
        assert!(breaks_framing("A||B"));
        assert!(breaks_framing("A|"));
        assert!(breaks_framing("|B"));
        assert!(!breaks_framing("A|B"));
        assert!(!breaks_framing(""));
    }

    #[test]
    fn trailing_pipe_does_not_round_trip() {
        let record = BookRecord::builder().title("A|").author("B").build();
        let restored = deserialize(&serialize(&record));
        assert_ne!(restored, record);
        assert_eq!(restored.title(), "A");
    }

    #[test]
    fn inner_single_pipe_round_trips() {
        let record = BookRecord::builder().title("A|B").author("C").build();
        assert_eq!(deserialize(&serialize(&record)), record);
    }

    #[test]
    fn key_is_not_persisted() {
        let record = BookRecord::builder().title("T").key("/works/OL1W").build();
        let line = serialize(&record);
        assert!(!line.contains("OL1W"));
        assert_eq!(deserialize(&line).key(), "");
    }
}
