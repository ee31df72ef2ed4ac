//! Directory batch processing

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::client::Translate;
use crate::core::config::TranslatorConfig;
use crate::core::error_log::ErrorLog;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{BatchReport, FileReport, FileStats};
use crate::processors::selective::SelectiveTranslator;

/// Runs the selective translator over every eligible file of a directory
#[derive(Debug)]
pub struct BatchRunner<T, L> {
    /// Per-document translator
    selective: SelectiveTranslator<T, L>,
    /// Listing and naming rules
    config: TranslatorConfig,
    /// One tick per file
    file_progress: ProgressBar,
    /// One tick per translated span
    span_progress: ProgressBar,
}

impl<T: Translate, L: ErrorLog> BatchRunner<T, L> {
    /// Create a new batch runner with hidden progress bars
    pub fn new(translator: T, error_log: L, config: TranslatorConfig) -> Self {
        let selective = SelectiveTranslator::new(translator, error_log, &config);
        Self {
            selective,
            config,
            file_progress: ProgressBar::hidden(),
            span_progress: ProgressBar::hidden(),
        }
    }

    /// Advance `progress` once per file; its length is set by `run`
    pub fn with_file_progress(mut self, progress: ProgressBar) -> Self {
        self.file_progress = progress;
        self
    }

    /// Advance `progress` once per span translated
    pub fn with_span_progress(mut self, progress: ProgressBar) -> Self {
        self.span_progress = progress;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Find eligible files in directory
    ///
    /// Entries that cannot be read are logged and left out.
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        if self.config.recursive {
            for entry in walkdir::WalkDir::new(dir).follow_links(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Cannot read entry under {}: {}", dir.display(), e);
                        continue;
                    }
                };
                let path = entry.path();
                if path.is_file() && self.is_eligible(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            for entry in std::fs::read_dir(dir).map_err(|e| TranslationError::file(dir, e))? {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        warn!("Cannot read entry under {}: {}", dir.display(), e);
                        continue;
                    }
                };
                if path.is_file() && self.is_eligible(&path) {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    /// Check file name against the configured extensions
    fn is_eligible(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if self.config.matches_extension(name).is_none() {
            return false;
        }

        if self.config.skip_translated && self.config.is_output_file_name(name) {
            debug!("Skipping previous output {}", path.display());
            return false;
        }

        true
    }

    /// Path of the translated copy of `input`
    pub fn output_path(&self, input: &Path) -> Option<PathBuf> {
        let name = input.file_name()?.to_str()?;
        let output_name = self.config.output_file_name(name)?;
        Some(input.with_file_name(output_name))
    }

    /// Translate every eligible file of `dir`
    ///
    /// A file that cannot be read or written is recorded in the report and
    /// the batch moves on. An unreadable directory aborts the run.
    pub async fn run(&self, dir: &Path) -> Result<BatchReport> {
        let jobs: Vec<(PathBuf, PathBuf)> = self
            .find_files(dir)?
            .into_iter()
            .filter_map(|input| self.output_path(&input).map(|output| (input, output)))
            .collect();
        let mut report = BatchReport::default();

        if jobs.is_empty() {
            warn!("No files found to translate in {}", dir.display());
            return Ok(report);
        }

        info!("Found {} files to translate in {}", jobs.len(), dir.display());
        self.file_progress.set_length(jobs.len() as u64);

        for (input, output) in jobs {
            self.file_progress
                .set_message(format!("Translating {}", input.display()));

            let outcome = self.translate_file(&input, &output).await;
            match &outcome {
                Ok(stats) => info!(
                    "Translated: {} -> {} ({} spans, {} failed, {} protected)",
                    input.display(),
                    output.display(),
                    stats.translated,
                    stats.failed,
                    stats.protected
                ),
                Err(e) => warn!("Skipping {}: {}", input.display(), e),
            }

            report.files.push(FileReport {
                input,
                output,
                outcome,
            });
            self.file_progress.inc(1);
        }

        info!(
            "Translation completed: {} processed, {} failed",
            report.processed(),
            report.failed()
        );

        Ok(report)
    }

    /// Translate a single file into `output`
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<FileStats> {
        debug!("Translating: {}", input.display());

        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| TranslationError::file(input, e))?;

        let document = self.selective.translate(&content, &self.span_progress).await;

        tokio::fs::write(output, &document.text)
            .await
            .map_err(|e| TranslationError::file(output, e))?;

        Ok(FileStats::from(&document))
    }
}
