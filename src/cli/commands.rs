//! CLI options and handlers

use clap::Args;
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use crate::core::client::GoogleTranslator;
use crate::core::config::TranslatorConfig;
use crate::core::error_log::{ConsoleErrorLog, ErrorLog, FileErrorLog};
use crate::processors::batch::BatchRunner;

/// Options for translating a directory
#[derive(Args, Debug, Default)]
pub struct TranslateOptions {
    /// Directory to scan (default: the directory containing this program)
    pub dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source language (default: en, "auto" to detect)
    #[arg(long)]
    pub source_lang: Option<String>,

    /// Target language (default: es)
    #[arg(short, long)]
    pub target_lang: Option<String>,

    /// Token inserted before the extension of output files (default: translated)
    #[arg(long)]
    pub suffix: Option<String>,

    /// Error log for failed strings (default: translator.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Recursively translate subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Ignore files that look like earlier outputs
    #[arg(long)]
    pub skip_translated: bool,

    /// Report failed strings on the console instead of the error log file
    #[arg(long)]
    pub log_console: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,
}

impl TranslateOptions {
    /// Merge file/env configuration with command line overrides
    pub fn resolve_config(&self) -> anyhow::Result<TranslatorConfig> {
        let mut config = match &self.config {
            Some(path) => TranslatorConfig::from_file(path)?,
            None => TranslatorConfig::from_env()?,
        };

        if let Some(source_lang) = &self.source_lang {
            config.source_lang = source_lang.clone();
        }
        if let Some(target_lang) = &self.target_lang {
            config.target_lang = target_lang.clone();
        }
        if let Some(suffix) = &self.suffix {
            config.output_suffix = suffix.clone();
        }
        if let Some(log_file) = &self.log_file {
            config.error_log = log_file.clone();
        }
        config.recursive |= self.recursive;
        config.skip_translated |= self.skip_translated;

        config.validate()?;
        Ok(config)
    }

    /// Directory to scan
    pub fn resolve_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let exe = std::env::current_exe()?;
                exe.parent()
                    .map(|p| p.to_path_buf())
                    .ok_or_else(|| anyhow::anyhow!("Cannot locate program directory"))
            }
        }
    }
}

/// Handle directory translation command
pub async fn handle_translate(options: TranslateOptions) -> anyhow::Result<()> {
    use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
    use std::time::Instant;
    use tracing::info;

    let start_time = Instant::now();

    let config = options.resolve_config()?;
    let dir = options.resolve_dir()?;

    println!("Looking for files in: {}", dir.display());
    info!("Source language: {}", config.source_lang);
    info!("Target language: {}", config.target_lang);

    let translator = GoogleTranslator::new(&config)?;
    let error_log: Box<dyn ErrorLog> = if options.log_console {
        Box::new(ConsoleErrorLog)
    } else {
        let log = FileErrorLog::new(&config.error_log);
        info!("Error log: {}", log.path().display());
        Box::new(log)
    };

    // Create progress bars
    let multi = MultiProgress::new();
    let pb = multi.add(ProgressBar::new(0));
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
        .progress_chars("=>-"));
    let spans = multi.add(ProgressBar::new_spinner());
    spans.set_style(ProgressStyle::default_spinner().template("  {pos} strings translated")?);

    let runner = BatchRunner::new(translator, error_log, config)
        .with_file_progress(pb.clone())
        .with_span_progress(spans.clone());

    let report = runner.run(&dir).await?;

    if report.is_empty() {
        pb.finish_and_clear();
        spans.finish_and_clear();
        println!("No files found to translate");
        pause_unless(options.no_pause)?;
        return Ok(());
    }

    pb.finish_with_message("Completed");
    spans.finish();

    for file in report.files.iter() {
        if let Err(e) = &file.outcome {
            eprintln!("Error processing {}: {}", file.input.display(), e);
        }
    }

    let totals = report.totals();
    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed, {} failed in {:?}",
        report.processed(),
        report.failed(),
        duration
    );

    if report.processed() > 0 {
        println!("\n✅ Translation completed!");
    }
    println!("   Processed: {}", report.processed());
    println!("   Failed: {}", report.failed());
    println!("   Strings translated: {}", totals.translated);
    println!("   Strings protected: {}", totals.protected);
    if totals.failed > 0 && !options.log_console {
        println!(
            "   Strings failed: {} (see {})",
            totals.failed,
            runner.config().error_log.display()
        );
    } else if totals.failed > 0 {
        println!("   Strings failed: {}", totals.failed);
    }
    println!("   Time: {:?}", duration);

    pause_unless(options.no_pause)?;
    Ok(())
}

/// Wait for Enter on an interactive terminal
fn pause_unless(skip: bool) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    if skip || !stdin.is_terminal() {
        return Ok(());
    }

    print!("Press Enter to close...");
    std::io::stdout().flush()?;
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"target_lang": "de", "output_suffix": "uebersetzt"}"#).unwrap();

        let options = TranslateOptions {
            config: Some(path),
            target_lang: Some("fr".to_string()),
            recursive: true,
            ..Default::default()
        };

        let config = options.resolve_config().unwrap();
        assert_eq!(config.target_lang, "fr");
        assert_eq!(config.output_suffix, "uebersetzt");
        assert!(config.recursive);
        assert!(!config.skip_translated);
    }

    #[test]
    fn test_resolve_config_rejects_bad_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let options = TranslateOptions {
            config: Some(path),
            suffix: Some(String::new()),
            ..Default::default()
        };

        assert!(options.resolve_config().is_err());
    }

    #[test]
    fn test_resolve_dir_prefers_argument() {
        let options = TranslateOptions {
            dir: Some(PathBuf::from("/tmp/configs")),
            ..Default::default()
        };
        assert_eq!(options.resolve_dir().unwrap(), PathBuf::from("/tmp/configs"));

        let default = TranslateOptions::default().resolve_dir().unwrap();
        assert!(default.is_dir());
    }
}
