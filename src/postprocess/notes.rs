//! Structured study-note extraction from generated text.
//!
//! Notes are derived deterministically from the reply text with plain
//! string heuristics.  Extraction is best-effort: when the text yields
//! nothing useful the pipeline ships the reply without notes rather than
//! failing the request.

use serde::{Deserialize, Serialize};

/// Upper bound on extracted key points.
pub const MAX_KEY_POINTS: usize = 3;

/// Queries that look like the student is studying a concept.  Only these
/// trigger note generation; chit-chat does not produce notes.
const LEARNING_PHRASES: &[&str] = &[
    "what is",
    "how does",
    "why is",
    "explain",
    "definition",
    "define",
    "concept of",
    "tell me about",
    "describe",
    "elaborate",
    "clarify",
    "teach me",
    "learn about",
];

// ---------------------------------------------------------------------------
// StructuredNotes
// ---------------------------------------------------------------------------

/// Title, key points and detail paragraphs pulled out of a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredNotes {
    pub title: String,
    /// At most [`MAX_KEY_POINTS`] entries, source order preserved.
    pub key_points: Vec<String>,
    /// Paragraphs longer than 50 characters, source order preserved.
    pub details: Vec<String>,
}

/// Whether the query reads like a learning question worth note-taking.
pub fn is_learning_question(query: &str) -> bool {
    let query = query.to_lowercase();
    LEARNING_PHRASES.iter().any(|p| query.contains(p))
}

/// Extract notes from reply text.  Returns `None` for blank input.
pub fn extract(text: &str) -> Option<StructuredNotes> {
    if text.trim().is_empty() {
        return None;
    }

    Some(StructuredNotes {
        title: extract_title(text),
        key_points: extract_key_points(text),
        details: extract_details(text),
    })
}

/// First line when it is a plausible heading (trimmed length strictly
/// between 3 and 100), else the first sentence capped at 100 chars, else
/// the literal "Notes".
fn extract_title(text: &str) -> String {
    if let Some(first_line) = text.lines().next() {
        let trimmed = first_line.trim();
        let len = trimmed.chars().count();
        if len > 3 && len < 100 {
            return trimmed.to_string();
        }
    }

    if let Some(sentence) = sentences(text).next() {
        let trimmed = sentence.trim();
        if !trimmed.is_empty() {
            return trimmed.chars().take(100).collect();
        }
    }

    "Notes".to_string()
}

/// Lines carrying a list marker: "•", "-", "*" or "<digit>.".
fn is_list_line(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with('•') || line.starts_with('-') || line.starts_with('*') {
        return true;
    }
    let mut chars = line.chars();
    matches!((chars.next(), chars.next()), (Some(d), Some('.')) if d.is_ascii_digit())
}

/// First [`MAX_KEY_POINTS`] list-marker lines; when the text carries fewer
/// than that, fall back to the first sentences of medium length (trimmed
/// length strictly between 10 and 150).
fn extract_key_points(text: &str) -> Vec<String> {
    let bullets: Vec<String> = text
        .lines()
        .filter(|l| is_list_line(l))
        .take(MAX_KEY_POINTS)
        .map(|l| l.trim().to_string())
        .collect();

    if bullets.len() >= MAX_KEY_POINTS {
        return bullets;
    }

    let fallback: Vec<String> = sentences(text)
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            len > 10 && len < 150
        })
        .take(MAX_KEY_POINTS)
        .map(|s| s.to_string())
        .collect();

    if fallback.is_empty() {
        bullets
    } else {
        fallback
    }
}

/// Paragraphs (blocks split on blank lines) longer than 50 characters.
fn extract_details(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > 50)
        .map(|p| p.to_string())
        .collect()
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?']).filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
