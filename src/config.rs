//! Service credentials and endpoints, read once and passed explicitly to
//! the clients that need them.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}

#[derive(Clone)]
pub struct AppConfig {
    pub vision_key: String,
    pub vision_endpoint: String,
    pub translate_key: String,
    pub translate_endpoint: String,
    pub default_language: String,
}

impl AppConfig {
    /// Reads `VISION_KEY`, `VISION_ENDPOINT` and `TRANSLATE_KEY`, plus the
    /// optional `TRANSLATE_ENDPOINT` and `TRANSLATE_LANGUAGE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] with a caller-supplied lookup.
    /// Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));

        Ok(Self {
            vision_key: require("VISION_KEY")?,
            vision_endpoint: require("VISION_ENDPOINT")?,
            translate_key: require("TRANSLATE_KEY")?,
            translate_endpoint: get("TRANSLATE_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_ENDPOINT.to_string()),
            default_language: get("TRANSLATE_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}

fn redact(secret: &str) -> String {
    match secret.chars().count() {
        0 => String::new(),
        n if n <= 8 => "***".to_string(),
        _ => format!("{}***", secret.chars().take(4).collect::<String>()),
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("vision_key", &redact(&self.vision_key))
            .field("vision_endpoint", &self.vision_endpoint)
            .field("translate_key", &redact(&self.translate_key))
            .field("translate_endpoint", &self.translate_endpoint)
            .field("default_language", &self.default_language)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_vars(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("VISION_KEY", "0123456789abcdef"),
        ("VISION_ENDPOINT", "https://vision.example.com/"),
        ("TRANSLATE_KEY", "fedcba9876543210"),
    ];

    #[test]
    fn applies_defaults_for_optional_vars() {
        let config = config(&REQUIRED).unwrap();
        assert_eq!(config.vision_endpoint, "https://vision.example.com/");
        assert_eq!(config.translate_endpoint, DEFAULT_TRANSLATE_ENDPOINT);
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn optional_vars_override_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TRANSLATE_ENDPOINT", "http://localhost:9000"));
        vars.push(("TRANSLATE_LANGUAGE", "fr"));
        let config = config(&vars).unwrap();
        assert_eq!(config.translate_endpoint, "http://localhost:9000");
        assert_eq!(config.default_language, "fr");
    }

    #[test]
    fn missing_or_blank_required_var_is_an_error() {
        let err = config(&REQUIRED[..2]).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("TRANSLATE_KEY"));

        let mut vars = REQUIRED.to_vec();
        vars[0] = ("VISION_KEY", "  ");
        assert_eq!(
            config(&vars).unwrap_err(),
            ConfigError::MissingVar("VISION_KEY")
        );
    }

    #[test]
    fn debug_output_hides_keys() {
        let rendered = format!("{:?}", config(&REQUIRED).unwrap());
        assert!(rendered.contains("0123***"));
        assert!(!rendered.contains("0123456789abcdef"));
        assert!(!rendered.contains("fedcba9876543210"));
    }
}
