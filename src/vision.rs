//! OCR collaborator boundary for image input.
//!
//! Images are turned into text before they enter the conversational
//! pipeline; the extraction itself happens outside this crate.

use async_trait::async_trait;
use thiserror::Error;

/// Errors an OCR provider can produce.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("ocr engine unavailable: {0}")]
    Unavailable(String),

    /// The image decoded but contained no readable text.
    #[error("image contained no readable text")]
    NoText,
}

/// Async trait for optical-character-recognition backends.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}
