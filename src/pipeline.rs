use tracing::info;

use crate::ocr::{extract_text_from_image, TextExtractor};
use crate::translator::{translate_text, Translate};

/// Extracts the text of `image` and translates it into `language`.
///
/// Failures of either service come back as a single message line, and a
/// message produced by the extraction step is translated like any other line.
pub fn translate_image(
    extractor: &dyn TextExtractor,
    translator: &dyn Translate,
    image: &[u8],
    language: &str,
) -> Vec<String> {
    let lines = extract_text_from_image(extractor, image);
    info!(lines = lines.len(), language, "translating extracted text");
    translate_text(translator, &lines, language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrError, OcrResult, NO_TEXT_MESSAGE};
    use crate::translator::TranslateError;

    struct Json(&'static str);

    impl TextExtractor for Json {
        fn recognize(&self, _image: &[u8]) -> Result<OcrResult, OcrError> {
            serde_json::from_str(self.0).map_err(|err| OcrError::Transport(err.to_string()))
        }
    }

    struct Tagging;

    impl Translate for Tagging {
        fn translate(&self, lines: &[String], to: &str) -> Result<Vec<String>, TranslateError> {
            Ok(lines.iter().map(|line| format!("[{}] {}", to, line)).collect())
        }
    }

    #[test]
    fn translates_each_extracted_line() {
        let extractor = Json(
            r#"{"regions": [{"lines": [
                {"words": [{"text": "Ausgang"}]},
                {"words": [{"text": "Bitte"}, {"text": "warten"}]}
            ]}]}"#,
        );
        assert_eq!(
            translate_image(&extractor, &Tagging, b"jpeg", "en"),
            vec!["[en] Ausgang", "[en] Bitte warten"]
        );
    }

    #[test]
    fn placeholder_is_translated_too() {
        let extractor = Json(r#"{"regions": []}"#);
        assert_eq!(
            translate_image(&extractor, &Tagging, b"jpeg", "de"),
            vec![format!("[de] {}", NO_TEXT_MESSAGE)]
        );
    }

    #[test]
    fn extraction_failure_message_is_passed_on() {
        let extractor = Json("not json");
        assert_eq!(
            translate_image(&extractor, &Tagging, b"jpeg", "fr"),
            vec!["[fr] Error calling the Computer Vision API"]
        );
    }
}
