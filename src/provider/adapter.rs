//! Core `TextGenerator` trait and the `ApiGenerator` implementation.
//!
//! `ApiGenerator` calls any OpenAI-compatible `/v1/chat/completions` endpoint:
//! OpenAI, Gemini's compatibility endpoint, Groq, Ollama, vLLM, etc.  All
//! connection details come from [`ProviderConfig`]; nothing is hardcoded.
//!
//! Raw provider faults are translated into the closed [`GenerationError`]
//! taxonomy exactly once, here at the boundary.  Nothing downstream ever
//! inspects HTTP statuses or error strings.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::provider::retry::Retryable;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors a generation provider can produce.
///
/// All variants are provider-local: the fallback chain decides what the
/// caller sees.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// HTTP 429: retryable with backoff, bounded.
    #[error("provider rate limited the request")]
    RateLimited,

    /// HTTP 401/403: fatal for this provider for the rest of the process.
    #[error("provider rejected the credentials: {0}")]
    AuthFailed(String),

    /// Transport failure, timeout, or a 5xx; fall through immediately.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but the result is unusable (missing or
    /// empty/too-short content).
    #[error("provider returned an unusable result: {0}")]
    Malformed(String),
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::RateLimited)
    }
}

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for text-generation backends.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// tasks as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// ApiGenerator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ApiGenerator {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl ApiGenerator {
    /// Build an `ApiGenerator` from provider config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used as a last-resort
    /// fallback if the builder fails (should never happen in practice).
    pub fn from_config(config: &ProviderConfig) -> Self {
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
impl TextGenerator for ApiGenerator {
    /// Send `prompt` to the configured endpoint and extract the completion.
    ///
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GenerationError::RateLimited);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GenerationError::AuthFailed(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(GenerationError::Unavailable(format!("HTTP {status}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::Malformed("missing message content".into()))?
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(GenerationError::Malformed("empty completion".into()));
        }

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            base_url: "https://api.openai.com".into(),
            api_key: api_key.map(|s| s.to_string()),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 30,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _gen = ApiGenerator::from_config(&make_config(None));
        let _gen = ApiGenerator::from_config(&make_config(Some("")));
        let _gen = ApiGenerator::from_config(&make_config(Some("sk-test-1234")));
    }

    /// `ApiGenerator` must be usable as `dyn TextGenerator`.
    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn TextGenerator> =
            Box::new(ApiGenerator::from_config(&make_config(None)));
        drop(generator);
    }

    #[test]
    fn only_rate_limited_is_retryable() {
        assert!(GenerationError::RateLimited.is_retryable());
        assert!(!GenerationError::AuthFailed("401".into()).is_retryable());
        assert!(!GenerationError::Unavailable("down".into()).is_retryable());
        assert!(!GenerationError::Malformed("empty".into()).is_retryable());
    }
}
