//! Post-save notification.
//!
//! Observers are plain callbacks run synchronously, in registration order,
//! after every successful append.

use bookadvisor_shared::BookRecord;
use tracing::info;

/// Something that reacts to a record being saved.
pub trait SaveObserver: Send + Sync {
    fn on_saved(&self, record: &BookRecord);
}

impl<F> SaveObserver for F
where
    F: Fn(&BookRecord) + Send + Sync,
{
    fn on_saved(&self, record: &BookRecord) {
        self(record)
    }
}

/// Emits one `info` log line per saved record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl SaveObserver for LogNotifier {
    fn on_saved(&self, record: &BookRecord) {
        info!(title = record.title(), author = record.author(), "book saved");
    }
}

/// Ordered list of registered observers.
#[derive(Default)]
pub struct ChangeNotifier {
    observers: Vec<Box<dyn SaveObserver>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer after all existing ones.
    pub fn register(&mut self, observer: impl SaveObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Invoke every observer with `record`.
    pub fn notify(&self, record: &BookRecord) {
        for observer in &self.observers {
            observer.on_saved(record);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}
