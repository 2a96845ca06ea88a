//! Server-side text-to-speech with a client-side fallback directive.
//!
//! Synthesis is best-effort: [`SpeechService::speak`] never errors.  When
//! the server-side synthesizer is absent, disabled, or fails after its
//! retry budget, the reply carries a [`ClientTtsDirective`] telling the UI
//! to synthesize locally with the browser's speech API instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SpeechConfig;
use crate::provider::{RetryPolicy, Retryable};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors a synthesis provider can produce.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP 429: retryable with backoff, bounded.
    #[error("speech provider rate limited the request")]
    RateLimited,

    /// Anything else: transport failure, bad status, unusable payload.
    #[error("speech provider unavailable: {0}")]
    Unavailable(String),
}

impl Retryable for SpeechError {
    fn is_retryable(&self) -> bool {
        matches!(self, SpeechError::RateLimited)
    }
}

// ---------------------------------------------------------------------------
// VoiceParams / SpeechSynthesizer
// ---------------------------------------------------------------------------

/// Voice selection passed with every synthesis call.
#[derive(Debug, Clone)]
pub struct VoiceParams {
    pub voice: String,
    pub language_code: String,
    pub speaking_rate: f32,
}

impl From<&SpeechConfig> for VoiceParams {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            voice: config.voice.clone(),
            language_code: config.language_code.clone(),
            speaking_rate: config.speaking_rate,
        }
    }
}

/// Async trait for text-to-speech backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceParams) -> Result<Vec<u8>, SpeechError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint and returns the
/// raw audio bytes.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl ApiSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ApiSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceParams) -> Result<Vec<u8>, SpeechError> {
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "input": text,
            "voice": voice.voice,
            "speed": voice.speaking_rate,
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SpeechError::RateLimited);
        }
        if !status.is_success() {
            return Err(SpeechError::Unavailable(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Unavailable(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SpeechError::Unavailable("empty audio payload".into()));
        }

        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// SpeechOutput / ClientTtsDirective
// ---------------------------------------------------------------------------

/// Instructs the client to synthesize speech locally.  A first-class result
/// variant, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTtsDirective {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
}

impl ClientTtsDirective {
    /// The fixed fallback voice: slightly slowed, natural pitch.
    pub fn for_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rate: 0.8,
            pitch: 1.0,
        }
    }
}

/// Audio for a reply.  Consumers must match on the variant before treating
/// the payload as bytes.
#[derive(Debug, Clone)]
pub enum SpeechOutput {
    /// Server-synthesized audio, ready to play.
    Audio(Vec<u8>),
    /// No server audio; the client synthesizes from the directive.
    ClientFallback(ClientTtsDirective),
}

// ---------------------------------------------------------------------------
// SpeechService
// ---------------------------------------------------------------------------

/// Wraps an optional synthesizer behind the never-fails `speak` call.
pub struct SpeechService {
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    voice: VoiceParams,
    retry: RetryPolicy,
}

impl SpeechService {
    pub fn new(synthesizer: Option<Arc<dyn SpeechSynthesizer>>, voice: VoiceParams) -> Self {
        Self {
            synthesizer,
            voice,
            retry: RetryPolicy::speech_synthesis(),
        }
    }

    /// A service that always answers with the client fallback.
    pub fn client_only(voice: VoiceParams) -> Self {
        Self::new(None, voice)
    }

    /// Synthesize `text`, falling back to a client directive on any failure.
    pub async fn speak(&self, text: &str) -> SpeechOutput {
        let Some(synthesizer) = &self.synthesizer else {
            return SpeechOutput::ClientFallback(ClientTtsDirective::for_text(text));
        };

        match self
            .retry
            .run(|| synthesizer.synthesize(text, &self.voice))
            .await
        {
            Ok(audio) => SpeechOutput::Audio(audio),
            Err(err) => {
                log::warn!("speech: synthesis failed, directing client fallback: {err}");
                SpeechOutput::ClientFallback(ClientTtsDirective::for_text(text))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct AlwaysAudio;

    #[async_trait]
    impl SpeechSynthesizer for AlwaysAudio {
        async fn synthesize(&self, _: &str, _: &VoiceParams) -> Result<Vec<u8>, SpeechError> {
            Ok(vec![1, 2, 3])
        }
    }

    struct AlwaysFails {
        make: fn() -> SpeechError,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl SpeechSynthesizer for AlwaysFails {
        async fn synthesize(&self, _: &str, _: &VoiceParams) -> Result<Vec<u8>, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.make)())
        }
    }

    fn voice() -> VoiceParams {
        VoiceParams::from(&SpeechConfig::default())
    }

    #[tokio::test]
    async fn working_synthesizer_returns_audio() {
        let service = SpeechService::new(Some(Arc::new(AlwaysAudio)), voice());
        match service.speak("hello").await {
            SpeechOutput::Audio(bytes) => assert_eq!(bytes, vec![1, 2, 3]),
            SpeechOutput::ClientFallback(_) => panic!("expected server audio"),
        }
    }

    #[tokio::test]
    async fn missing_synthesizer_directs_client_fallback() {
        let service = SpeechService::client_only(voice());
        match service.speak("read this aloud").await {
            SpeechOutput::ClientFallback(d) => {
                assert_eq!(d.text, "read this aloud");
                assert_eq!(d.rate, 0.8);
                assert_eq!(d.pitch, 1.0);
            }
            SpeechOutput::Audio(_) => panic!("no synthesizer configured"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_burns_retry_budget_then_falls_back() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = SpeechService::new(
            Some(Arc::new(AlwaysFails {
                make: || SpeechError::RateLimited,
                calls: Arc::clone(&calls),
            })),
            voice(),
        );

        let started = tokio::time::Instant::now();
        let output = service.speak("hello").await;

        assert!(matches!(output, SpeechOutput::ClientFallback(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 3 s before attempt 2, 6 s before attempt 3.
        assert_eq!(started.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test]
    async fn unavailable_falls_back_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let service = SpeechService::new(
            Some(Arc::new(AlwaysFails {
                make: || SpeechError::Unavailable("down".into()),
                calls: Arc::clone(&calls),
            })),
            voice(),
        );

        let output = service.speak("hello").await;
        assert!(matches!(output, SpeechOutput::ClientFallback(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn directive_serializes_camel_case() {
        let json = serde_json::to_value(ClientTtsDirective::for_text("hi")).unwrap();
        assert_eq!(json["text"], "hi");
        // f32 fields round-trip through f64 in serde_json.
        assert_eq!(json["rate"].as_f64().unwrap() as f32, 0.8);
        assert_eq!(json["pitch"].as_f64().unwrap() as f32, 1.0);
    }
}
