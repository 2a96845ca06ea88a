//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Connection settings for one OpenAI-compatible generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether this provider participates in the fallback chain.
    pub enabled: bool,
    /// Base URL of the API endpoint (no trailing slash).
    pub base_url: String,
    /// API key; `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Completion token budget per request.
    pub max_tokens: u32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 800,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// The two interchangeable generation backends, in fallback priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Tried first for every generation call.
    pub primary: ProviderConfig,
    /// Takes over when the primary is exhausted or fails non-retryably.
    pub secondary: ProviderConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
                model: "gemini-1.5-pro".into(),
                ..ProviderConfig::default()
            },
            secondary: ProviderConfig {
                max_tokens: 500,
                ..ProviderConfig::default()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the server-side text-to-speech collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Whether server-side synthesis is attempted at all.  When disabled,
    /// every reply carries a client-TTS directive.
    pub enabled: bool,
    /// Base URL of the TTS endpoint (no trailing slash).
    pub base_url: String,
    /// API key; `None` when the endpoint needs no authentication.
    pub api_key: Option<String>,
    /// Voice name sent to the API.
    pub voice: String,
    /// BCP-47 language code for synthesis.
    pub language_code: String,
    /// Speaking rate; slightly below 1.0 for comprehension.
    pub speaking_rate: f32,
    /// Maximum seconds to wait for synthesis before timing out.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com".into(),
            api_key: None,
            voice: "en-US-Neural2-F".into(),
            language_code: "en-US".into(),
            speaking_rate: 0.92,
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Orchestrator-level limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Hard per-request deadline; beyond it the orchestrator answers with
    /// canned text instead of continuing to retry.
    pub request_deadline_secs: u64,
    /// How many recent conversation turns a fresh-question prompt embeds.
    pub context_turns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_deadline_secs: 60,
            context_turns: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use sage_tutor::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generation backends in fallback order.
    pub generation: GenerationConfig,
    /// Server-side TTS settings.
    pub speech: SpeechConfig,
    /// Orchestrator limits.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// so callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` must survive a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values_match_documented_backends() {
        let cfg = AppConfig::default();

        assert!(cfg.generation.primary.enabled);
        assert_eq!(cfg.generation.primary.model, "gemini-1.5-pro");
        assert_eq!(
            cfg.generation.primary.base_url,
            "https://generativelanguage.googleapis.com/v1beta/openai"
        );
        assert_eq!(cfg.generation.secondary.model, "gpt-3.5-turbo");
        assert_eq!(cfg.generation.secondary.base_url, "https://api.openai.com");
        assert_eq!(cfg.generation.secondary.max_tokens, 500);

        assert!(cfg.speech.enabled);
        assert_eq!(cfg.speech.language_code, "en-US");

        assert_eq!(cfg.pipeline.request_deadline_secs, 60);
        assert_eq!(cfg.pipeline.context_turns, 5);
    }

    /// Modified non-default values must survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.generation.primary.enabled = false;
        cfg.generation.secondary.api_key = Some("sk-test".into());
        cfg.generation.secondary.model = "gpt-4o-mini".into();
        cfg.speech.enabled = false;
        cfg.speech.voice = "en-GB-News-K".into();
        cfg.pipeline.request_deadline_secs = 30;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
        assert!(!loaded.generation.primary.enabled);
        assert_eq!(loaded.generation.secondary.api_key, Some("sk-test".into()));
        assert_eq!(loaded.pipeline.request_deadline_secs, 30);
    }

    /// A partial TOML file fills missing sections from defaults.
    #[test]
    fn partial_file_uses_defaults_for_missing_sections() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[pipeline]\nrequest_deadline_secs = 10\ncontext_turns = 2\n",
        )
        .expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.pipeline.request_deadline_secs, 10);
        assert_eq!(loaded.pipeline.context_turns, 2);
        assert_eq!(loaded.generation, GenerationConfig::default());
    }
}
