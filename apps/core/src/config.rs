//! Runtime configuration
//! Loaded from environment variables (a `.env` file is honored at startup).

use std::env;
use std::time::Duration;
use url::Url;
use validator::Validate;

use crate::error::AppError;

/// Default analyze endpoint of a locally running proxy.
pub const DEFAULT_ANALYZE_URL: &str = "http://127.0.0.1:8787/api/analyze";
const DEFAULT_TIMEOUT_SECS: u64 = 45;
const DEFAULT_OCR_LANGUAGE: &str = "eng";

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, Validate)]
pub struct CoreConfig {
    /// Full URL of the analyze endpoint on the proxy.
    pub analyze_url: Url,
    /// Upper bound in seconds for one round trip to the proxy.
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
    /// Tesseract language code used for screenshot extraction.
    #[validate(length(min = 1))]
    pub ocr_language: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            analyze_url: Url::parse(DEFAULT_ANALYZE_URL).expect("default analyze URL is valid"),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

impl CoreConfig {
    /// Builds the configuration from the environment, falling back to
    /// defaults for anything unset.
    ///
    /// Variables: `OVERTHINKR_PROXY_URL`, `OVERTHINKR_TIMEOUT_SECS`,
    /// `OVERTHINKR_OCR_LANG`.
    pub fn from_env() -> Result<Self, AppError> {
        let analyze_url = match env::var("OVERTHINKR_PROXY_URL") {
            Ok(raw) => Url::parse(&raw)
                .map_err(|e| AppError::Config(format!("OVERTHINKR_PROXY_URL: {}", e)))?,
            Err(_) => Url::parse(DEFAULT_ANALYZE_URL)?,
        };

        let request_timeout_secs = match env::var("OVERTHINKR_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("OVERTHINKR_TIMEOUT_SECS: {}", e)))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let ocr_language =
            env::var("OVERTHINKR_OCR_LANG").unwrap_or_else(|_| DEFAULT_OCR_LANGUAGE.to_string());

        let config = Self {
            analyze_url,
            request_timeout_secs,
            ocr_language,
        };
        config.validate()?;
        Ok(config)
    }

    /// The proxy round-trip bound as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
