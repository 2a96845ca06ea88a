//! Speech-recognition collaborator boundary.
//!
//! Transcription happens outside this crate; the pipeline only needs a
//! trait to hand audio bytes through.  A missing or failing transcriber
//! turns into a canned "could not understand" reply upstream.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a recognition provider can produce.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognizer unavailable: {0}")]
    Unavailable(String),

    /// The audio decoded but produced no usable transcript.
    #[error("audio produced no transcript")]
    NoTranscript,
}

/// Async trait for speech-to-text backends.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, RecognitionError>;
}
