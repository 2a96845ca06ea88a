//! Rule-based emotion tagging for tutor replies.
//!
//! The avatar/voice layer in the UI uses the tag to pick an expression.
//! Rules are checked in a fixed order; the first match wins.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EmotionTag
// ---------------------------------------------------------------------------

/// Derived per reply, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTag {
    Neutral,
    Thoughtful,
    Happy,
    Excited,
    Concerned,
}

impl EmotionTag {
    /// Wire-format label, matching the serde representation.
    pub fn label(&self) -> &'static str {
        match self {
            EmotionTag::Neutral => "neutral",
            EmotionTag::Thoughtful => "thoughtful",
            EmotionTag::Happy => "happy",
            EmotionTag::Excited => "excited",
            EmotionTag::Concerned => "concerned",
        }
    }
}

const THOUGHTFUL_WORDS: &[&str] = &["how", "why", "what", "explain"];
const HAPPY_WORDS: &[&str] = &["thanks", "thank", "appreciate"];
const EXCITED_WORDS: &[&str] = &["amazing", "wow", "cool", "awesome"];

/// Pick an emotion for a reply, in rule order:
///
/// 1. Response mentions "error" or "sorry" → Concerned.
/// 2. Query asks how/why/what/explain → Thoughtful.
/// 3. Query expresses gratitude → Happy.
/// 4. Query expresses excitement → Excited.
/// 5. Otherwise → Neutral.
pub fn classify(query: &str, response: &str) -> EmotionTag {
    let query = query.to_lowercase();
    let response = response.to_lowercase();

    if response.contains("error") || response.contains("sorry") {
        return EmotionTag::Concerned;
    }
    if THOUGHTFUL_WORDS.iter().any(|w| query.contains(w)) {
        return EmotionTag::Thoughtful;
    }
    if HAPPY_WORDS.iter().any(|w| query.contains(w)) {
        return EmotionTag::Happy;
    }
    if EXCITED_WORDS.iter().any(|w| query.contains(w)) {
        return EmotionTag::Excited;
    }
    EmotionTag::Neutral
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
