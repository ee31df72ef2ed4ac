//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::errors::TranslationError;

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code, `auto` to detect
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
}

impl TranslationRequest {
    /// Create a request with automatic source language detection
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: "auto".to_string(),
            target_lang: target_lang.into(),
        }
    }

    /// Set the source language
    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Translated text
    pub translation: String,
    /// Language reported by the service, if any
    pub detected_source_lang: Option<String>,
}

impl TranslationResult {
    /// Result without a detected language
    pub fn new(translation: impl Into<String>) -> Self {
        Self {
            translation: translation.into(),
            detected_source_lang: None,
        }
    }
}

/// A span that was translated successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanTranslation {
    /// Span text as found in the source
    pub original: String,
    /// Replacement written to the output
    pub translated: String,
}

/// A span whose translation failed and was left as is
#[derive(Debug)]
pub struct SpanFailure {
    /// Span text as found in the source
    pub original: String,
    /// Why the translation was rejected
    pub error: TranslationError,
}

/// Outcome of translating one document
#[derive(Debug, Default)]
pub struct TranslatedDocument {
    /// Final text with translations substituted
    pub text: String,
    /// Unique spans translated, in order of first appearance
    pub translated: Vec<SpanTranslation>,
    /// Unique spans whose translation failed
    pub failures: Vec<SpanFailure>,
    /// Unique spans skipped because they are protected
    pub protected: Vec<String>,
}

impl TranslatedDocument {
    /// At least one span kept its original text after a failure
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Outcome of one file in a batch
#[derive(Debug)]
pub struct FileReport {
    /// File that was read
    pub input: PathBuf,
    /// Translated copy
    pub output: PathBuf,
    /// Span counts, or the read/write error that aborted the file
    pub outcome: std::result::Result<FileStats, TranslationError>,
}

/// Span counts for a file that was written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Unique spans translated
    pub translated: usize,
    /// Unique spans left untranslated after a failure
    pub failed: usize,
    /// Unique spans skipped as protected
    pub protected: usize,
}

impl From<&TranslatedDocument> for FileStats {
    fn from(doc: &TranslatedDocument) -> Self {
        Self {
            translated: doc.translated.len(),
            failed: doc.failures.len(),
            protected: doc.protected.len(),
        }
    }
}

/// Aggregated outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per eligible file, in processing order
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// No eligible file was found
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files written successfully
    pub fn processed(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_ok()).count()
    }

    /// Files aborted by a read or write error
    pub fn failed(&self) -> usize {
        self.files.len() - self.processed()
    }

    /// Sum of span counts over written files
    pub fn totals(&self) -> FileStats {
        self.files
            .iter()
            .filter_map(|f| f.outcome.as_ref().ok())
            .fold(FileStats::default(), |acc, s| FileStats {
                translated: acc.translated + s.translated,
                failed: acc.failed + s.failed,
                protected: acc.protected + s.protected,
            })
    }
}
