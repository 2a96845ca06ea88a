//! Intent classification for incoming student text.
//!
//! [`classify`] is a pure function of the raw text and the caller-supplied
//! context flags.  Precedence is fixed: Greeting > ExplainAgain > FollowUp >
//! Fresh; the first matching rule wins.

use crate::conversation::ConversationContext;

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// What the student is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Bare "hi" / "hello", answered with the fixed greeting and no
    /// provider call.
    Greeting,
    /// The student wants the same topic explained differently.
    ExplainAgain,
    /// Continuation of the previous exchange.
    FollowUp,
    /// A new question with no special handling.
    Fresh,
}

/// Phrases that mark a re-explanation request, matched as substrings of the
/// lowercased text.
const EXPLAIN_AGAIN_PHRASES: &[&str] = &[
    "explain again",
    "explain it again",
    "explain that again",
    "can you explain again",
    "please explain again",
    "one more time",
];

/// Classify `raw_text` against the conversation context.
///
/// * Greeting: trimmed, lowercased text equals `"hi"` or `"hello"` exactly
///   (no substring match).
/// * ExplainAgain: the caller set `is_explain_again`, or the text contains
///   one of the known re-explanation phrases.
/// * FollowUp: the caller set `is_follow_up` and this is not ExplainAgain.
/// * Fresh: everything else.
pub fn classify(raw_text: &str, ctx: &ConversationContext) -> Intent {
    let lower = raw_text.trim().to_lowercase();

    if lower == "hi" || lower == "hello" {
        return Intent::Greeting;
    }

    if ctx.is_explain_again || EXPLAIN_AGAIN_PHRASES.iter().any(|p| lower.contains(p)) {
        return Intent::ExplainAgain;
    }

    if ctx.is_follow_up {
        return Intent::FollowUp;
    }

    Intent::Fresh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ConversationContext {
        ConversationContext::default()
    }

    #[test]
    fn exact_greetings_classify_as_greeting() {
        for text in ["hi", "hello", "  Hi  ", "HELLO", "\thello\n"] {
            assert_eq!(classify(text, &ctx()), Intent::Greeting, "text: {text:?}");
        }
    }

    #[test]
    fn greeting_requires_exact_match() {
        assert_eq!(classify("hi there", &ctx()), Intent::Fresh);
        assert_eq!(classify("hello world", &ctx()), Intent::Fresh);
        assert_eq!(classify("highway", &ctx()), Intent::Fresh);
    }

    #[test]
    fn explain_again_phrases_win_over_flags() {
        let mut c = ctx();
        c.is_follow_up = true;
        assert_eq!(
            classify("could you explain that again please", &c),
            Intent::ExplainAgain
        );
        assert_eq!(classify("ONE MORE TIME", &c), Intent::ExplainAgain);
        assert_eq!(classify("Please explain again", &c), Intent::ExplainAgain);
    }

    #[test]
    fn explain_again_flag_alone_is_enough() {
        let mut c = ctx();
        c.is_explain_again = true;
        assert_eq!(classify("what about the second part?", &c), Intent::ExplainAgain);
    }

    #[test]
    fn follow_up_flag_without_explain_again() {
        let mut c = ctx();
        c.is_follow_up = true;
        assert_eq!(classify("and what happens next?", &c), Intent::FollowUp);
    }

    #[test]
    fn plain_question_is_fresh() {
        assert_eq!(classify("What is photosynthesis?", &ctx()), Intent::Fresh);
    }

    #[test]
    fn greeting_beats_every_flag() {
        let mut c = ctx();
        c.is_follow_up = true;
        c.is_explain_again = true;
        assert_eq!(classify("hi", &c), Intent::Greeting);
    }
}
