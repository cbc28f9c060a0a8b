//! Batch text translation through a cloud translation service.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;

pub const ERROR_PREFIX: &str = "Error calling the Translator Text API";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{status} {message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Other(err.to_string())
    }
}

pub trait Translate {
    /// Translates every line into `to`, one output line per translation
    /// returned by the service, in input order.
    fn translate(&self, lines: &[String], to: &str) -> Result<Vec<String>, TranslateError>;
}

/// Translates `lines` and never fails.
///
/// The result is either the translated lines or exactly one error line;
/// callers cannot tell the two apart by comparing lengths with the input.
pub fn translate_text(translator: &dyn Translate, lines: &[String], language: &str) -> Vec<String> {
    if lines.is_empty() {
        return Vec::new();
    }
    match translator.translate(lines, language) {
        Ok(translated) => translated,
        Err(err @ TranslateError::Http { .. }) => {
            warn!(error = %err, "translation service returned an error status");
            vec![format!("{}: {}", ERROR_PREFIX, err)]
        }
        Err(err) => {
            warn!(error = %err, "translation service call failed");
            vec![ERROR_PREFIX.to_string()]
        }
    }
}

#[derive(Debug, Serialize)]
struct TextItem<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
pub struct Translation {
    pub text: String,
}

/// Flattens every translation of every item, preserving order.
pub fn flatten_translations(results: Vec<TranslationResult>) -> Vec<String> {
    results
        .into_iter()
        .flat_map(|result| result.translations)
        .map(|translation| translation.text)
        .collect()
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct TranslatorClient {
    endpoint: String,
    key: String,
    client: Client,
}

impl TranslatorClient {
    pub fn new(endpoint: &str, key: &str) -> Self {
        Self::with_client(endpoint, key, Client::new())
    }

    /// Uses a preconfigured HTTP client (proxy, timeouts, TLS settings).
    pub fn with_client(endpoint: &str, key: &str, client: Client) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.translate_endpoint, &config.translate_key)
    }

    fn url(&self) -> String {
        format!("{}/translate", self.endpoint)
    }
}

impl Translate for TranslatorClient {
    fn translate(&self, lines: &[String], to: &str) -> Result<Vec<String>, TranslateError> {
        let body: Vec<TextItem<'_>> = lines.iter().map(|text| TextItem { text }).collect();
        debug!(lines = body.len(), to, "sending translation batch");

        let response = self
            .client
            .post(self.url())
            .query(&[("api-version", "3.0"), ("to", to)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(http_error(status, &text));
        }
        let results: Vec<TranslationResult> = response.json()?;
        Ok(flatten_translations(results))
    }
}

fn http_error(status: reqwest::StatusCode, body: &str) -> TranslateError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
    TranslateError::Http {
        status: status.as_u16(),
        message,
    }
}
