//! Optical text extraction from screenshots
//! Shells out to the tesseract binary; the pipeline only ever sees the text.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::AppError;

/// Defines the public interface for the OCR collaborator.
///
/// Output is raw message text, trimmed of surrounding whitespace. Anything
/// that prevents usable text from coming out of the image is an
/// `UnreadableImage` failure.
#[async_trait]
pub trait TextExtractor: Send + Sync + 'static {
    /// Extracts the text content of one image file.
    async fn extract_text(&self, image: &Path) -> Result<String, AppError>;
}

/// Tesseract-backed extractor. Requires the `tesseract` binary on PATH; a
/// missing binary is a configuration problem, not an unreadable input.
pub struct TesseractExtractor {
    language: String,
}

impl TesseractExtractor {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract_text(&self, image: &Path) -> Result<String, AppError> {
        info!("Extracting text from image: {}", image.display());

        let bytes = tokio::fs::read(image).await.map_err(|e| {
            AppError::UnreadableImage(format!("could not read {}: {}", image.display(), e))
        })?;
        if !infer::is_image(&bytes) {
            return Err(AppError::UnreadableImage(
                "not a recognized image format".to_string(),
            ));
        }

        which::which("tesseract")?;

        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Tesseract failed: {}", stderr.trim());
            return Err(AppError::UnreadableImage(format!(
                "text recognition failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(AppError::UnreadableImage(
                "no text recognized in image".to_string(),
            ));
        }

        info!("OCR successful: {} characters", text.len());
        Ok(text)
    }
}
