//! Quote Translator - translate quoted string literals in configuration files
//!
//! This library finds single-quoted strings in `.yml`, `.txt` and `.json`
//! files, translates them through an external service and writes translated
//! copies, leaving `material:` values and `{...}` placeholders untouched.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod core;
pub mod processors;
pub mod cli;

// Re-export key types for convenience
pub use self::core::{
    client::{GoogleTranslator, Translate},
    config::TranslatorConfig,
    error_log::{ConsoleErrorLog, ErrorLog, FileErrorLog, MemoryErrorLog},
    models::{BatchReport, FileReport, FileStats, TranslatedDocument, TranslationRequest, TranslationResult},
    errors::TranslationError,
};

pub use self::processors::{
    batch::BatchRunner,
    selective::SelectiveTranslator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
