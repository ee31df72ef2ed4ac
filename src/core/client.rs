//! Translation service client

use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};

/// A translation service
///
/// Implementations may fail for any input; callers decide what a failure
/// means. No retries are expected from implementations.
#[allow(async_fn_in_trait)]
pub trait Translate {
    /// Translate a single request
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult>;
}

impl<T: Translate> Translate for &T {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        (**self).translate(request).await
    }
}

/// Client for the public Google Translate `translate_a/single` endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Full URL of `translate_a/single`
    endpoint: String,
}

impl GoogleTranslator {
    /// Create a new client from configuration
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_endpoint.clone(),
        })
    }

    /// Send actual HTTP request
    async fn send_request(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", request.source_lang.as_str()),
                ("tl", request.target_lang.as_str()),
                ("dt", "t"),
                ("q", request.text.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let json: serde_json::Value =
                response
                    .json()
                    .await
                    .map_err(|e| TranslationError::InvalidResponseError {
                        message: e.to_string(),
                    })?;

            parse_response(&json)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            Err(TranslationError::RateLimitError { retry_after })
        } else {
            let error_text = response.text().await.unwrap_or_default();

            Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

impl Translate for GoogleTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        // Nothing to translate, and the endpoint answers blanks with an empty body
        if request.text.trim().is_empty() {
            return Ok(TranslationResult::new(request.text.clone()));
        }

        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source_lang,
            request.target_lang
        );

        self.send_request(request).await
    }
}

/// Parse a `translate_a/single` body
///
/// The body is a nested array: `[[["hola","hello",...], ...], null, "en", ...]`.
/// Element 0 holds one entry per sentence, each starting with the translated
/// fragment; element 2 is the detected source language.
fn parse_response(json: &serde_json::Value) -> Result<TranslationResult> {
    let sentences = json
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslationError::InvalidResponseError {
            message: "No translation in response".to_string(),
        })?;

    let translation: String = sentences
        .iter()
        .filter_map(|s| s.get(0).and_then(|t| t.as_str()))
        .collect();

    if translation.is_empty() {
        return Err(TranslationError::InvalidResponseError {
            message: "Empty translation in response".to_string(),
        });
    }

    let detected_source_lang = json
        .get(2)
        .and_then(|l| l.as_str())
        .map(|l| l.to_string());

    Ok(TranslationResult {
        translation,
        detected_source_lang,
    })
}
