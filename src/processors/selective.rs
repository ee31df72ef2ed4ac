//! Selective translation of quoted spans
//!
//! Every single-quoted span of a document is sent to the translation service
//! once per distinct text, unless it is protected (a `material:` value or the
//! content of a `{...}` region). Occurrences that sit inside a `{...}` region
//! are never rewritten. The document is then rebuilt token by token, so text
//! outside quoted spans is copied byte for byte.

use indicatif::ProgressBar;
use std::collections::HashMap;
use tracing::debug;

use crate::core::client::Translate;
use crate::core::config::TranslatorConfig;
use crate::core::error_log::ErrorLog;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{SpanFailure, SpanTranslation, TranslatedDocument, TranslationRequest};
use crate::processors::lexer::{
    brace_regions, mark_braces, restore_braces, Lexed, ProtectedSet, Token,
};

/// Translates the quoted spans of a document
#[derive(Debug, Clone)]
pub struct SelectiveTranslator<T, L> {
    /// Translation service
    translator: T,
    /// Sink for failed spans
    error_log: L,
    /// Source language code
    source_lang: String,
    /// Target language code
    target_lang: String,
}

impl<T: Translate, L: ErrorLog> SelectiveTranslator<T, L> {
    /// Create a new selective translator
    pub fn new(translator: T, error_log: L, config: &TranslatorConfig) -> Self {
        Self::with_languages(
            translator,
            error_log,
            config.source_lang.clone(),
            config.target_lang.clone(),
        )
    }

    /// Create a selective translator with explicit languages
    pub fn with_languages(
        translator: T,
        error_log: L,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            error_log,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Translate every unprotected quoted span of `content`
    ///
    /// `progress` advances once per distinct span translated successfully.
    /// Failed spans are recorded in the error log and left untouched.
    pub async fn translate(&self, content: &str, progress: &ProgressBar) -> TranslatedDocument {
        let lexed = Lexed::new(content);
        let protected = ProtectedSet::from_source(content);
        let free = lexed.free_spans();

        let mut document = TranslatedDocument::default();
        let mut replacements: HashMap<&str, String> = HashMap::new();

        for span in lexed.unique_spans() {
            if protected.is_material(span) {
                debug!("Skipping material value '{}'", span);
                document.protected.push(span.to_string());
                continue;
            }

            if protected.contains(span) || !free.contains(span) {
                debug!("Skipping brace-protected span '{}'", span);
                document.protected.push(span.to_string());
                continue;
            }

            match self.translate_span(span).await {
                Ok(translated) => {
                    replacements.insert(span, translated.clone());
                    document.translated.push(SpanTranslation {
                        original: span.to_string(),
                        translated,
                    });
                    progress.inc(1);
                }
                Err(error) => {
                    debug!("Translation failed for span '{}': {}", span, error);
                    self.error_log.record(span, &error);
                    document.failures.push(SpanFailure {
                        original: span.to_string(),
                        error,
                    });
                }
            }
        }

        document.text = rebuild(&lexed, &replacements);
        document
    }

    /// Translate one span with its braces masked from the service
    async fn translate_span(&self, span: &str) -> Result<String> {
        let request = TranslationRequest::new(mark_braces(span), self.target_lang.as_str())
            .with_source_lang(self.source_lang.as_str());

        let result = self.translator.translate(&request).await?;
        let translated = restore_braces(&result.translation);

        check_placeholders(span, &translated)?;
        Ok(translated)
    }
}

/// Fail when the translation lost, added or altered a `{...}` region
fn check_placeholders(original: &str, translated: &str) -> Result<()> {
    let mut expected = brace_regions(original);
    let mut found = brace_regions(translated);
    expected.sort_unstable();
    found.sort_unstable();

    if expected == found {
        Ok(())
    } else {
        Err(TranslationError::PlaceholderMismatch {
            expected: expected.into_iter().map(str::to_string).collect(),
            found: found.into_iter().map(str::to_string).collect(),
        })
    }
}

/// Reassemble the document, substituting quoted spans by token
///
/// Spans reaching into a `{...}` region are copied as they are.
fn rebuild(lexed: &Lexed<'_>, replacements: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(lexed.source().len());

    for token in lexed.tokens() {
        let text = lexed.text(token);
        match token {
            Token::Quoted(_) if lexed.is_braced(token) => result.push_str(text),
            Token::Quoted(_) => match replacements.get(text) {
                Some(translated) => result.push_str(translated),
                None => result.push_str(text),
            },
            Token::Literal(_) => result.push_str(text),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_log::MemoryErrorLog;
    use crate::core::models::TranslationResult;
    use crate::processors::lexer::{END_MARKER, START_MARKER};
    use std::sync::Mutex;

    /// Translates from a fixed table, fails for anything else
    struct MapTranslator {
        table: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapTranslator {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                table: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Translate for MapTranslator {
        async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
            self.requests.lock().unwrap().push(request.text.clone());
            self.table
                .get(&request.text)
                .map(|t| TranslationResult::new(t.clone()))
                .ok_or_else(|| TranslationError::ApiError {
                    status: 400,
                    message: format!("unsupported input: {}", request.text),
                })
        }
    }

    fn selective(
        translator: &MapTranslator,
    ) -> (SelectiveTranslator<&MapTranslator, MemoryErrorLog>, MemoryErrorLog) {
        let log = MemoryErrorLog::new();
        (
            SelectiveTranslator::with_languages(translator, log.clone(), "en", "es"),
            log,
        )
    }

    fn marked(text: &str) -> String {
        text.replace('{', START_MARKER).replace('}', END_MARKER)
    }

    #[tokio::test]
    async fn test_translates_quoted_value() {
        let translator = MapTranslator::new(&[("hello", "hola")]);
        let (selective, log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective.translate("greeting: 'hello'", &progress).await;

        assert_eq!(doc.text, "greeting: 'hola'");
        assert_eq!(progress.position(), 1);
        assert!(log.is_empty());
        assert_eq!(
            doc.translated,
            vec![SpanTranslation {
                original: "hello".to_string(),
                translated: "hola".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_material_value_is_protected() {
        let translator = MapTranslator::new(&[("steel", "acero")]);
        let (selective, log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective.translate("material: 'steel'", &progress).await;

        assert_eq!(doc.text, "material: 'steel'");
        assert!(translator.requests().is_empty());
        assert_eq!(doc.protected, vec!["steel".to_string()]);
        assert_eq!(progress.position(), 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_braces_are_masked_from_service() {
        let translator = MapTranslator::new(&[(
            marked("{id} says hello").as_str(),
            marked("{id} dice hola").as_str(),
        )]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("note: '{id} says hello'", &ProgressBar::hidden())
            .await;

        assert_eq!(doc.text, "note: '{id} dice hola'");
        assert_eq!(translator.requests(), vec![marked("{id} says hello")]);
    }

    #[tokio::test]
    async fn test_failed_span_is_kept_and_logged() {
        let translator = MapTranslator::new(&[("Sword", "Espada")]);
        let (selective, log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective
            .translate("name: 'Sword'\nlore: 'Forged in fire'\n", &progress)
            .await;

        assert_eq!(doc.text, "name: 'Espada'\nlore: 'Forged in fire'\n");
        assert_eq!(progress.position(), 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].original, "Forged in fire");
        assert!(log.entries()[0].message.contains("400"));
        assert_eq!(doc.failures.len(), 1);
        assert!(doc.has_failures());
    }

    #[tokio::test]
    async fn test_duplicates_translated_once_replaced_everywhere() {
        let translator = MapTranslator::new(&[("Yes", "Sí"), ("No", "No")]);
        let (selective, _log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective
            .translate("a: 'Yes'\nb: 'No'\nc: 'Yes'\n", &progress)
            .await;

        assert_eq!(doc.text, "a: 'Sí'\nb: 'No'\nc: 'Sí'\n");
        assert_eq!(translator.requests(), vec!["Yes", "No"]);
        assert_eq!(progress.position(), 2);
    }

    #[tokio::test]
    async fn test_substring_spans_do_not_interfere() {
        let translator = MapTranslator::new(&[
            ("hello", "hello world"),
            ("hello world", "hola mundo"),
        ]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("a: 'hello'\nb: 'hello world'\n", &ProgressBar::hidden())
            .await;

        // A translation equal to another span's text is not translated again
        assert_eq!(doc.text, "a: 'hello world'\nb: 'hola mundo'\n");
    }

    #[tokio::test]
    async fn test_translation_with_quotes_does_not_shift_spans() {
        let translator = MapTranslator::new(&[("Open", "l'Ouvrir"), ("Close", "Fermer")]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("x: 'Open' y: 'Close'", &ProgressBar::hidden())
            .await;

        assert_eq!(doc.text, "x: 'l'Ouvrir' y: 'Fermer'");
    }

    #[tokio::test]
    async fn test_text_outside_spans_is_untouched() {
        let translator = MapTranslator::new(&[("Hi", "Hola")]);
        let (selective, _log) = selective(&translator);
        let source = "# {header}\n  key:   'Hi'  \t{'raw': 1}\n\nit's done\n";

        let doc = selective.translate(source, &ProgressBar::hidden()).await;

        assert_eq!(doc.text, "# {header}\n  key:   'Hola'  \t{'raw': 1}\n\nit's done\n");
        assert_eq!(
            doc.text.matches('{').count(),
            source.matches('{').count()
        );
        assert_eq!(
            doc.text.matches('}').count(),
            source.matches('}').count()
        );
    }

    #[tokio::test]
    async fn test_brace_content_is_protected() {
        let translator = MapTranslator::new(&[("player", "jugador")]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("msg: '{player}'\nkey: 'player'\n", &ProgressBar::hidden())
            .await;

        // "player" appears inside braces, so the bare span is protected too
        assert!(doc.text.ends_with("key: 'player'\n"));
        assert!(doc.protected.contains(&"player".to_string()));
    }

    #[tokio::test]
    async fn test_spans_inside_braces_are_not_translated() {
        let translator = MapTranslator::new(&[("mode", "modo"), ("fast", "rápido")]);
        let (selective, log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective
            .translate("opts: {'mode': 'fast'}
", &progress)
            .await;

        assert_eq!(doc.text, "opts: {'mode': 'fast'}
");
        assert!(translator.requests().is_empty());
        assert_eq!(doc.protected, vec!["mode".to_string(), "fast".to_string()]);
        assert_eq!(progress.position(), 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_braced_occurrence_kept_when_text_also_appears_outside() {
        let translator = MapTranslator::new(&[("mode", "modo")]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("opts: {'mode': 1}
name: 'mode'
", &ProgressBar::hidden())
            .await;

        assert_eq!(doc.text, "opts: {'mode': 1}
name: 'modo'
");
        assert_eq!(translator.requests(), vec!["mode"]);
    }

    #[tokio::test]
    async fn test_material_text_protected_everywhere() {
        let translator = MapTranslator::new(&[("Gold", "Oro")]);
        let (selective, _log) = selective(&translator);

        let doc = selective
            .translate("material: 'Gold'\ntitle: 'Gold'\n", &ProgressBar::hidden())
            .await;

        assert_eq!(doc.text, "material: 'Gold'\ntitle: 'Gold'\n");
        assert!(translator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_lost_placeholder_is_a_failure() {
        let translator = MapTranslator::new(&[(
            marked("{count} items").as_str(),
            "muchos artículos",
        )]);
        let (selective, log) = selective(&translator);
        let progress = ProgressBar::hidden();

        let doc = selective
            .translate("label: '{count} items'", &progress)
            .await;

        assert_eq!(doc.text, "label: '{count} items'");
        assert_eq!(progress.position(), 0);
        assert_eq!(log.len(), 1);
        assert!(matches!(
            doc.failures[0].error,
            TranslationError::PlaceholderMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_span_does_not_abort() {
        let translator = MapTranslator::new(&[("Axe", "Hacha")]);
        let (selective, log) = selective(&translator);

        let doc = selective
            .translate("a: ''\nb: 'Axe'\n", &ProgressBar::hidden())
            .await;

        assert_eq!(doc.text, "a: ''\nb: 'Hacha'\n");
        assert_eq!(translator.requests(), vec!["", "Axe"]);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_check_placeholders_ignores_order() {
        assert!(check_placeholders("{a} then {b}", "{b} luego {a}").is_ok());
        assert!(check_placeholders("{a}", "{A}").is_err());
        assert!(check_placeholders("plain", "{x}").is_err());
    }
}
