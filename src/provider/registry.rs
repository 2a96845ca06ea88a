//! Provider wiring from configuration.
//!
//! Built once at process start and handed into the orchestrator; no global
//! client state.  Disabled providers simply never enter the chain, so the
//! canned-fallback path stays available even with zero providers
//! configured.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::provider::adapter::ApiGenerator;
use crate::provider::fallback::FallbackChain;
use crate::speech::{ApiSynthesizer, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// ProviderHealth
// ---------------------------------------------------------------------------

/// Snapshot of which providers are currently usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHealth {
    pub primary: bool,
    pub secondary: bool,
    pub speech: bool,
}

// ---------------------------------------------------------------------------
// ProviderRegistry
// ---------------------------------------------------------------------------

/// All externally-reachable providers, constructed from [`AppConfig`].
pub struct ProviderRegistry {
    chain: Arc<FallbackChain>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl ProviderRegistry {
    pub const PRIMARY: &'static str = "primary";
    pub const SECONDARY: &'static str = "secondary";

    /// Build generators and the synthesizer from config.  Providers with
    /// `enabled = false` are left out entirely.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut chain = FallbackChain::new();

        if config.generation.primary.enabled {
            chain.push(
                Self::PRIMARY,
                Arc::new(ApiGenerator::from_config(&config.generation.primary)),
            );
        } else {
            log::info!("registry: primary generation provider disabled by config");
        }

        if config.generation.secondary.enabled {
            chain.push(
                Self::SECONDARY,
                Arc::new(ApiGenerator::from_config(&config.generation.secondary)),
            );
        } else {
            log::info!("registry: secondary generation provider disabled by config");
        }

        let synthesizer: Option<Arc<dyn SpeechSynthesizer>> = if config.speech.enabled {
            Some(Arc::new(ApiSynthesizer::from_config(&config.speech)))
        } else {
            log::info!("registry: server speech synthesis disabled by config");
            None
        };

        Self {
            chain: Arc::new(chain),
            synthesizer,
        }
    }

    pub fn chain(&self) -> Arc<FallbackChain> {
        Arc::clone(&self.chain)
    }

    pub fn synthesizer(&self) -> Option<Arc<dyn SpeechSynthesizer>> {
        self.synthesizer.clone()
    }

    /// Current usability snapshot.  Generation providers drop out of the
    /// chain permanently on auth failure; speech reflects configuration
    /// only, since synthesis failures fall back per call.
    pub fn health(&self) -> ProviderHealth {
        ProviderHealth {
            primary: self.chain.is_active(Self::PRIMARY),
            secondary: self.chain.is_active(Self::SECONDARY),
            speech: self.synthesizer.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
