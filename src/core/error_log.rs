//! Sinks for span translation failures

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

use crate::core::errors::TranslationError;

/// Destination for `(original text, error)` pairs of failed translations
pub trait ErrorLog {
    /// Record one failed span
    fn record(&self, original: &str, error: &TranslationError);
}

impl<L: ErrorLog + ?Sized> ErrorLog for &L {
    fn record(&self, original: &str, error: &TranslationError) {
        (**self).record(original, error)
    }
}

impl<L: ErrorLog + ?Sized> ErrorLog for Arc<L> {
    fn record(&self, original: &str, error: &TranslationError) {
        (**self).record(original, error)
    }
}

impl<L: ErrorLog + ?Sized> ErrorLog for Box<L> {
    fn record(&self, original: &str, error: &TranslationError) {
        (**self).record(original, error)
    }
}

/// Append-only log file, one line per failure
#[derive(Debug, Clone)]
pub struct FileErrorLog {
    /// Log file, created on first write
    path: PathBuf,
}

impl FileErrorLog {
    /// Log to `path`, appending to existing content
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line, opening the file each time
    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl ErrorLog for FileErrorLog {
    fn record(&self, original: &str, error: &TranslationError) {
        let line = format!(
            "{} ERROR failed to translate '{}': {}",
            chrono::Utc::now().to_rfc3339(),
            original,
            error
        );
        // A broken log must not stop the batch
        if let Err(e) = self.append(&line) {
            warn!("Cannot write error log {}: {}", self.path.display(), e);
        }
    }
}

/// Sends failures to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorLog;

impl ErrorLog for ConsoleErrorLog {
    fn record(&self, original: &str, error: &TranslationError) {
        error!("Failed to translate '{}': {}", original, error);
    }
}

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedError {
    /// Span text that failed
    pub original: String,
    /// Rendered error
    pub message: String,
}

/// In-memory sink, cheap to clone and shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryErrorLog {
    /// Recorded failures
    entries: Arc<Mutex<Vec<LoggedError>>>,
}

impl MemoryErrorLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<LoggedError> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of recorded failures
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Nothing recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorLog for MemoryErrorLog {
    fn record(&self, original: &str, error: &TranslationError) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LoggedError {
                original: original.to_string(),
                message: error.to_string(),
            });
        }
    }
}
