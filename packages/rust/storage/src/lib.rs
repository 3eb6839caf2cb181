//! Flat-file library store.
//!
//! The [`RecordStore`] keeps one [`BookRecord`] per line in a text file (see
//! [`codec`] for the layout) and supports three operations: load everything,
//! append one record, and overwrite everything.
//!
//! **Access rules:**
//! - single writer by convention; nothing here locks the file
//! - a missing file is an empty library, not an error

pub mod codec;
pub mod notifier;
pub mod sink;

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use bookadvisor_shared::{BookAdvisorError, BookRecord, Result};
use tracing::{debug, error, info, warn};

pub use notifier::{ChangeNotifier, LogNotifier, SaveObserver};
pub use sink::{ConsoleSink, RecordSink};

/// Library file name used when none is configured.
pub const DEFAULT_LIBRARY_FILE: &str = "library.txt";

/// Handle to the library file plus its save observers.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    notifier: ChangeNotifier,
}

impl RecordStore {
    /// Open a store over `path`. Nothing is touched on disk until the first
    /// operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register an observer to run after every successful append.
    pub fn register(&mut self, observer: impl SaveObserver + 'static) {
        self.notifier.register(observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.notifier.len()
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Load every record in file order.
    ///
    /// A missing or unreadable file yields an empty library. Blank lines are
    /// skipped; every other line is decoded leniently on its own.
    pub fn load_all(&self) -> Vec<BookRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "library file not found, treating as empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "library file unreadable, treating as empty");
                return Vec::new();
            }
        };

        let records: Vec<BookRecord> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(codec::deserialize)
            .collect();

        info!(count = records.len(), "library loaded");
        records
    }

    // -----------------------------------------------------------------------
    // Write
    // -----------------------------------------------------------------------

    /// Append one record as a new line, then notify observers.
    ///
    /// The line is written with a single call so earlier lines are never
    /// touched. On failure nothing is retried and observers are not run.
    pub fn append_one(&self, record: &BookRecord) -> Result<()> {
        let result = self.try_append(record);

        match &result {
            Ok(()) => {
                self.notifier.notify(record);
                info!(title = record.title(), "book appended to library");
            }
            Err(e) => error!(error = %e, title = record.title(), "failed to append book"),
        }

        result
    }

    /// Replace the whole library with `records`, in order.
    ///
    /// The new content goes to a sibling temporary file that is then renamed
    /// over the library, so a failed write leaves the old content in place.
    /// Passing an empty slice clears the library.
    pub fn overwrite_all(&self, records: &[BookRecord]) -> Result<()> {
        let result = self.try_overwrite(records);

        match &result {
            Ok(()) => info!(count = records.len(), "library overwritten"),
            Err(e) => error!(error = %e, "failed to overwrite library"),
        }

        result
    }

    fn try_append(&self, record: &BookRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut line = codec::serialize(record);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| BookAdvisorError::io(&self.path, e))?;

        file.write_all(line.as_bytes())
            .map_err(|e| BookAdvisorError::io(&self.path, e))
    }

    fn try_overwrite(&self, records: &[BookRecord]) -> Result<()> {
        self.ensure_parent_dir()?;

        let tmp = self.temp_path();
        if let Err(e) = write_lines(&tmp, records) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            BookAdvisorError::io(&self.path, e)
        })
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|e| BookAdvisorError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from(DEFAULT_LIBRARY_FILE));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY_FILE)
    }
}

/// Write every record to a fresh file at `path`.
fn write_lines(path: &Path, records: &[BookRecord]) -> Result<()> {
    let file = File::create(path).map_err(|e| BookAdvisorError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writeln!(writer, "{}", codec::serialize(record)).map_err(|e| BookAdvisorError::io(path, e))?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| BookAdvisorError::io(path, e.into_error()))?;
    file.sync_all().map_err(|e| BookAdvisorError::io(path, e))
}
