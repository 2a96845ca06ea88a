//! Deterministic canned responses.
//!
//! The last rung of every fallback ladder: whatever the providers do, these
//! templates are always applicable, so the user-facing path always ends
//! with valid text.

/// Substituted when the whole request fails or the deadline expires.
pub const TROUBLE_TEXT: &str =
    "I'm sorry, I'm having trouble processing your request right now. \
     Please try again in a moment.";

/// Substituted when every generation provider fails on the conversational
/// path.
pub const GENERATION_TROUBLE_TEXT: &str =
    "I'm having trouble generating a response due to technical issues. \
     Please try again in a few moments.";

/// Substituted when voice input cannot be transcribed.
pub const RECOGNITION_UNAVAILABLE_TEXT: &str =
    "I'm sorry, I couldn't understand the audio. Could you try again or \
     type your question instead?";

/// Substituted when image input yields no readable text.
pub const OCR_UNAVAILABLE_TEXT: &str =
    "I'm sorry, I couldn't read any text in that image. Could you try a \
     clearer picture or type your question instead?";

/// Five generic practice questions built from the topic by substitution.
pub fn practice_questions(topic: &str) -> String {
    format!(
        "1. What are the key components of {topic}?\n\
         2. How does {topic} relate to real-world applications?\n\
         3. What are the main challenges in understanding {topic}?\n\
         4. How has {topic} evolved over time?\n\
         5. What are the future implications or developments related to {topic}?"
    )
}

/// Curated follow-on topics, scanned in insertion order; the first key
/// contained in the lowercased input wins.
const RELATED_TOPICS: &[(&str, &str)] = &[
    ("data science", "machine learning"),
    ("data", "data science"),
    ("machine learning", "neural networks"),
    ("artificial intelligence", "machine learning ethics"),
    ("programming", "software development"),
    ("software", "software engineering"),
    ("ecosystem", "biodiversity"),
    ("environment", "climate change"),
    ("physics", "quantum mechanics"),
    ("chemistry", "organic chemistry"),
    ("biology", "genetics"),
    ("history", "world war II"),
    ("mathematics", "linear algebra"),
    ("math", "calculus"),
    ("computer", "computer architecture"),
    ("network", "cybersecurity"),
    ("security", "encryption"),
    ("web", "web development"),
];

/// Broad defaults when no curated pairing matches; picked by topic length
/// so the suggestion is stable for a given input.
const DEFAULT_TOPICS: &[&str] = &[
    "astronomy",
    "psychology",
    "world geography",
    "classical literature",
    "economics",
];

/// Suggest a related topic without any provider call.
pub fn related_topic(topic: &str) -> String {
    let lower = topic.to_lowercase();
    for (key, suggestion) in RELATED_TOPICS {
        if lower.contains(key) {
            return (*suggestion).to_string();
        }
    }
    DEFAULT_TOPICS[topic.len() % DEFAULT_TOPICS.len()].to_string()
}
