//! Ordered provider fallback with per-call-site retry.
//!
//! [`FallbackChain`] tries providers in priority order (primary LLM, then
//! secondary), running each under the [`RetryPolicy`] the call site passes
//! in.  Failures fall through silently (logged, never surfaced) while any
//! provider remains.  When every provider fails the chain returns the last
//! error and the call site substitutes its canned response, so best-effort
//! endpoints never propagate raw failure to the end caller.
//!
//! `AuthFailed` permanently disables the offending provider for the rest of
//! the process: those credentials will not start working again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::provider::adapter::{GenerationError, TextGenerator};
use crate::provider::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// ProviderSlot
// ---------------------------------------------------------------------------

struct ProviderSlot {
    name: String,
    generator: Arc<dyn TextGenerator>,
    /// Set once on AuthFailed; never cleared.
    disabled: AtomicBool,
}

// ---------------------------------------------------------------------------
// FallbackChain
// ---------------------------------------------------------------------------

/// Providers in priority order, tried until one yields usable text.
///
/// An empty chain (no provider configured at all) fails every call
/// immediately, which call sites answer with canned text; the canned path
/// is always available.
pub struct FallbackChain {
    slots: Vec<ProviderSlot>,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a provider at the lowest priority so far.
    pub fn push(&mut self, name: impl Into<String>, generator: Arc<dyn TextGenerator>) {
        self.slots.push(ProviderSlot {
            name: name.into(),
            generator,
            disabled: AtomicBool::new(false),
        });
    }

    /// Whether the named provider exists and has not been disabled.
    pub fn is_active(&self, name: &str) -> bool {
        self.slots
            .iter()
            .any(|s| s.name == name && !s.disabled.load(Ordering::Relaxed))
    }

    /// Number of providers still usable.
    pub fn active_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| !s.disabled.load(Ordering::Relaxed))
            .count()
    }

    /// Try each active provider in order under `retry`.
    ///
    /// A success shorter than `min_len` (after trimming) counts as
    /// [`GenerationError::Malformed`] and falls through to the next
    /// provider.  Returns the last failure when all providers are exhausted.
    pub async fn generate(
        &self,
        prompt: &str,
        min_len: usize,
        retry: &RetryPolicy,
    ) -> Result<String, GenerationError> {
        let mut last_err = GenerationError::Unavailable("no providers configured".into());

        for slot in &self.slots {
            if slot.disabled.load(Ordering::Relaxed) {
                continue;
            }

            match retry.run(|| slot.generator.generate(prompt)).await {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.len() < min_len {
                        log::warn!(
                            "chain: provider '{}' returned {} chars (< {min_len}), falling through",
                            slot.name,
                            trimmed.len()
                        );
                        last_err = GenerationError::Malformed(format!(
                            "result too short ({} chars)",
                            trimmed.len()
                        ));
                        continue;
                    }
                    return Ok(trimmed.to_string());
                }
                Err(GenerationError::AuthFailed(msg)) => {
                    log::error!(
                        "chain: provider '{}' auth failed, disabled for this process: {msg}",
                        slot.name
                    );
                    slot.disabled.store(true, Ordering::Relaxed);
                    last_err = GenerationError::AuthFailed(msg);
                }
                Err(err) => {
                    log::warn!("chain: provider '{}' failed, falling through: {err}", slot.name);
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
