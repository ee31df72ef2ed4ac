//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default translation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// File extensions picked up by the batch runner
const DEFAULT_EXTENSIONS: &[&str] = &[".yml", ".txt", ".json"];

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Translation service URL
    pub api_endpoint: String,
    /// Source language code, or `auto`
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Inserted before the extension of every output file
    pub output_suffix: String,
    /// Case-sensitive filename suffixes eligible for translation
    pub extensions: Vec<String>,
    /// Append-only log of failed span translations
    pub error_log: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Leave out files that are outputs of an earlier run
    pub skip_translated: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            source_lang: "en".to_string(),
            target_lang: "es".to_string(),
            timeout_ms: 30000,
            output_suffix: "translated".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            error_log: PathBuf::from("translator.log"),
            recursive: false,
            skip_translated: false,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(api_endpoint) = std::env::var("TRANSLATE_ENDPOINT") {
            config.api_endpoint = api_endpoint;
        }

        if let Ok(source_lang) = std::env::var("SOURCE_LANG") {
            config.source_lang = source_lang;
        }

        if let Ok(target_lang) = std::env::var("TARGET_LANG") {
            config.target_lang = target_lang;
        }

        config.timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        if let Ok(output_suffix) = std::env::var("OUTPUT_SUFFIX") {
            config.output_suffix = output_suffix;
        }

        if let Ok(error_log) = std::env::var("ERROR_LOG_PATH") {
            config.error_log = PathBuf::from(error_log);
        }

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_endpoint.is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.target_lang.is_empty() {
            return Err(anyhow::anyhow!("Target language is required"));
        }

        if self.source_lang.is_empty() {
            return Err(anyhow::anyhow!("Source language is required (use \"auto\" to detect)"));
        }

        if self.output_suffix.is_empty() {
            return Err(anyhow::anyhow!("Output suffix must not be empty"));
        }

        if self
            .output_suffix
            .contains(|c: char| std::path::is_separator(c))
        {
            return Err(anyhow::anyhow!("Output suffix must not contain path separators"));
        }

        if self.extensions.is_empty() {
            warn!("No file extensions configured, nothing will be translated");
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Check whether a file name is eligible for translation
    pub fn matches_extension(&self, file_name: &str) -> Option<&str> {
        self.extensions
            .iter()
            .map(String::as_str)
            .find(|ext| file_name.ends_with(ext))
    }

    /// Build the output file name for an eligible input file name
    pub fn output_file_name(&self, file_name: &str) -> Option<String> {
        let ext = self.matches_extension(file_name)?;
        let stem = &file_name[..file_name.len() - ext.len()];
        Some(format!("{}-{}{}", stem, self.output_suffix, ext))
    }

    /// Check whether a file name looks like one of our own outputs
    pub fn is_output_file_name(&self, file_name: &str) -> bool {
        let marker = format!("-{}", self.output_suffix);
        self.matches_extension(file_name)
            .map(|ext| file_name[..file_name.len() - ext.len()].ends_with(&marker))
            .unwrap_or(false)
    }
}
