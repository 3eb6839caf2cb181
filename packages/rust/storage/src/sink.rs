//! Save destinations selectable at runtime (library file or console).

use std::io::Write;
use std::sync::Mutex;

use bookadvisor_shared::{BookAdvisorError, BookRecord, Result};

use crate::RecordStore;

/// Where saved records go.
pub trait RecordSink: Send + Sync {
    /// Short name for logs and user messages.
    fn name(&self) -> &'static str;

    /// Save one record.
    fn save(&self, record: &BookRecord) -> Result<()>;

    /// Replace everything previously saved with `records`.
    fn save_all(&self, records: &[BookRecord]) -> Result<()>;
}

impl RecordSink for RecordStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn save(&self, record: &BookRecord) -> Result<()> {
        self.append_one(record)
    }

    fn save_all(&self, records: &[BookRecord]) -> Result<()> {
        self.overwrite_all(records)
    }
}

/// Prints records instead of persisting them.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer, e.g. to inspect captured output.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| BookAdvisorError::Storage("console writer lock poisoned".into()))?;
        for line in lines {
            writeln!(out, "{line}").map_err(|e| BookAdvisorError::io("<console>", e))?;
        }
        out.flush().map_err(|e| BookAdvisorError::io("<console>", e))
    }
}

impl<W: Write + Send> RecordSink for ConsoleSink<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn save(&self, record: &BookRecord) -> Result<()> {
        self.write_lines(&[
            "Simulated save to console:".to_string(),
            format!("- {} - {}", record.title(), record.author()),
        ])
    }

    fn save_all(&self, records: &[BookRecord]) -> Result<()> {
        let mut lines = vec![format!(
            "Simulated save to console of {} book(s):",
            records.len()
        )];
        lines.extend(
            records
                .iter()
                .map(|r| format!("- {} - {}", r.title(), r.author())),
        );
        self.write_lines(&lines)
    }
}
