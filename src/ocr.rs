//! Printed-text recognition through a cloud vision service.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;

pub const NO_TEXT_MESSAGE: &str = "Photo contains no text to translate";
pub const GENERIC_ERROR_MESSAGE: &str = "Error calling the Computer Vision API";

const OCR_PATH: &str = "vision/v3.2/ocr";

#[derive(Debug, Error)]
pub enum OcrError {
    /// The service answered with an error of its own.
    #[error("{code}: {message}")]
    Service { code: String, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        OcrError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrResult {
    #[serde(default)]
    pub regions: Vec<OcrRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrRegion {
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrLine {
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrWord {
    pub text: String,
}

impl OcrResult {
    /// Text lines of the first detected region, words joined by a single
    /// space. An image without any region yields [`NO_TEXT_MESSAGE`].
    pub fn lines(&self) -> Vec<String> {
        let Some(region) = self.regions.first() else {
            return vec![NO_TEXT_MESSAGE.to_string()];
        };
        region
            .lines
            .iter()
            .map(|line| {
                line.words
                    .iter()
                    .map(|word| word.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

pub trait TextExtractor {
    fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError>;
}

/// Runs recognition and never fails: errors become a single human-readable line.
pub fn extract_text_from_image(extractor: &dyn TextExtractor, image: &[u8]) -> Vec<String> {
    match extractor.recognize(image) {
        Ok(result) => result.lines(),
        Err(OcrError::Service { code, message }) => {
            warn!(code = %code, "vision service rejected the image: {}", message);
            vec![format!("Computer Vision API error: {}", message)]
        }
        Err(err) => {
            warn!(error = %err, "vision service call failed");
            vec![GENERIC_ERROR_MESSAGE.to_string()]
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Client for the vision service's synchronous OCR endpoint.
pub struct VisionClient {
    endpoint: String,
    key: String,
    client: Client,
}

impl VisionClient {
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
        Self::new(&config.vision_endpoint, &config.vision_key)
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, OCR_PATH)
    }
}

impl TextExtractor for VisionClient {
    fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError> {
        let response = self
            .client
            .post(self.url())
            .query(&[("language", "unk"), ("detectOrientation", "true")])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(service_error(status, &body));
        }
        Ok(response.json()?)
    }
}

fn service_error(status: reqwest::StatusCode, body: &str) -> OcrError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => OcrError::Service {
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => OcrError::Service {
            code: status.as_str().to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(fn() -> Result<OcrResult, OcrError>);

    impl TextExtractor for Fixed {
        fn recognize(&self, _image: &[u8]) -> Result<OcrResult, OcrError> {
            (self.0)()
        }
    }

    fn parse(json: &str) -> OcrResult {
        serde_json::from_str(json).expect("valid OCR response")
    }

    #[test]
    fn joins_words_of_the_first_region_only() {
        let result = parse(
            r#"{
                "language": "fr",
                "orientation": "Up",
                "regions": [
                    {"boundingBox": "0,0,10,10", "lines": [
                        {"words": [{"text": "Bonjour"}, {"text": "le"}, {"text": "monde"}]},
                        {"words": [{"text": "Sortie"}]}
                    ]},
                    {"lines": [{"words": [{"text": "ignored"}]}]}
                ]
            }"#,
        );
        assert_eq!(result.lines(), vec!["Bonjour le monde", "Sortie"]);
    }

    #[test]
    fn no_regions_yields_placeholder() {
        let result = parse(r#"{"language": "unk", "regions": []}"#);
        assert_eq!(result.lines(), vec![NO_TEXT_MESSAGE]);
        assert_eq!(OcrResult::default().lines(), vec![NO_TEXT_MESSAGE]);
    }

    #[test]
    fn service_error_is_reported_with_its_message() {
        let extractor = Fixed(|| {
            Err(OcrError::Service {
                code: "InvalidImageSize".into(),
                message: "Image must be at least 50 pixels".into(),
            })
        });
        assert_eq!(
            extract_text_from_image(&extractor, b"img"),
            vec!["Computer Vision API error: Image must be at least 50 pixels"]
        );
    }

    #[test]
    fn other_errors_are_generic() {
        let extractor = Fixed(|| Err(OcrError::Transport("connection reset".into())));
        assert_eq!(
            extract_text_from_image(&extractor, b"img"),
            vec![GENERIC_ERROR_MESSAGE]
        );
    }

    #[test]
    fn service_error_body_is_decoded() {
        let err = service_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": {"code": "InvalidImageFormat", "message": "Input data is not a valid image."}}"#,
        );
        assert!(matches!(
            err,
            OcrError::Service { ref code, ref message }
                if code == "InvalidImageFormat" && message == "Input data is not a valid image."
        ));
    }

    #[test]
    fn undecodable_error_body_falls_back_to_status() {
        let err = service_error(reqwest::StatusCode::UNAUTHORIZED, "<html>nope</html>");
        assert_eq!(err.to_string(), "401: Unauthorized");
    }

    #[test]
    fn url_strips_trailing_slash() {
        let client = VisionClient::new("https://example.cognitiveservices.azure.com/", "k");
        assert_eq!(
            client.url(),
            "https://example.cognitiveservices.azure.com/vision/v3.2/ocr"
        );
    }
}
