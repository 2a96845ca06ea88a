//! Prompt construction for the tutoring pipeline.
//!
//! [`PromptBuilder`] turns raw student text plus the classified
//! [`Intent`](crate::intent::Intent) and conversation context into the final
//! prompt string sent to the generation providers.  Each intent has its own
//! template; all generation templates end with the same style-guideline
//! block so the response format stays consistent regardless of intent.
//!
//! The greeting intent is special: it resolves to a fixed response string
//! and the orchestrator skips generation entirely.

use crate::conversation::{ConversationContext, Role};
use crate::intent::Intent;

// ---------------------------------------------------------------------------
// Fixed text blocks
// ---------------------------------------------------------------------------

/// Spoken/displayed verbatim for bare greetings; never sent to a provider.
pub const GREETING_TEXT: &str =
    "Hi, I'm Sage. How can I help you today? What are you interested in learning about?";

const PERSONA_PREAMBLE: &str = "\
You are Sage, a personalized AI tutor having a one-on-one conversation with \
a student. Explain things in a warm, conversational, teacher-like way and help \
the student truly understand instead of reciting information.";

const STYLE_GUIDELINES: &str = "
Style guidelines:
- Keep a warm, conversational, teacher-like tone.
- Answer simple questions and follow-ups in 2-3 sentences.
- Give concept explanations in 4-6 sentences with concrete examples.
- End with a short, relevant follow-up question when it helps the student.";

/// Subjects scanned for when the re-explanation topic cannot be resolved any
/// other way.  Known heuristic: first hit wins, which can misfire in
/// multi-topic conversations.
const TOPIC_KEYWORDS: &[&str] = &[
    "addition",
    "subtraction",
    "multiplication",
    "division",
    "fractions",
    "algebra",
    "geometry",
    "chemistry",
    "physics",
];

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds provider prompts for every intent plus the auxiliary call sites
/// (practice questions, topic suggestion, study notes).
///
/// # Example
/// ```rust
/// use sage_tutor::conversation::ConversationContext;
/// use sage_tutor::intent::Intent;
/// use sage_tutor::prompt::PromptBuilder;
///
/// let builder = PromptBuilder::new();
/// let prompt = builder.build(
///     "What is photosynthesis?",
///     Intent::Fresh,
///     &ConversationContext::default(),
/// );
/// assert!(prompt.contains("photosynthesis"));
/// ```
pub struct PromptBuilder {
    /// How many recent turns are embedded in a fresh-question prompt.
    context_turns: usize,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self { context_turns: 5 }
    }

    pub fn with_context_turns(context_turns: usize) -> Self {
        Self { context_turns }
    }

    /// The fixed greeting response.
    pub fn greeting(&self) -> &'static str {
        GREETING_TEXT
    }

    /// Build the prompt for a conversational request.
    ///
    /// For [`Intent::Greeting`] this returns the fixed greeting text itself;
    /// callers must not send it to a provider.
    pub fn build(&self, raw_text: &str, intent: Intent, ctx: &ConversationContext) -> String {
        match intent {
            Intent::Greeting => GREETING_TEXT.to_string(),
            Intent::ExplainAgain => self.explain_again(raw_text, ctx),
            Intent::FollowUp => self.follow_up(raw_text, ctx),
            Intent::Fresh => self.fresh(raw_text, ctx),
        }
    }

    /// Prompt for the best-effort practice-questions call site.
    pub fn practice_questions(&self, topic: &str) -> String {
        format!(
            "Generate 5 practice questions about {topic}. \
             Format each question as a numbered list."
        )
    }

    /// Prompt for the best-effort topic-suggestion call site.
    pub fn suggest_topic(&self, topic: &str) -> String {
        format!(
            "Based on an interest in '{topic}', suggest one related topic that a \
             person might want to learn about next. Respond with just the name of \
             the topic, no additional text."
        )
    }

    /// Prompt for best-effort study-note generation.
    pub fn study_notes(&self, topic: &str) -> String {
        format!(
            "Create structured notes about \"{topic}\" for a student.\n\
             \n\
             Structure the notes as follows:\n\
             1. Definition/Overview (1-2 sentences)\n\
             2. Key Points (3-5 bullet points)\n\
             3. Examples or Applications (1-2 concrete examples)\n\
             4. Visual Description (describe a diagram that would help understand the concept)\n\
             \n\
             Format the notes with clear section headings, bullet points, and numbered \
             lists. Keep them concise, clear, and visually organized."
        )
    }

    // -----------------------------------------------------------------------
    // Intent templates
    // -----------------------------------------------------------------------

    /// Re-explanation prompt: a NEW explanation of the resolved topic, never
    /// meta-commentary about the request itself.
    fn explain_again(&self, raw_text: &str, ctx: &ConversationContext) -> String {
        let topic = resolve_topic(ctx);
        let previous = ctx.last_assistant_message();

        let mut p = String::with_capacity(1024);
        p.push_str(PERSONA_PREAMBLE);
        p.push_str("\n\nThe student has asked you to explain the topic again.\n");
        if !topic.is_empty() {
            p.push_str(&format!("The topic to re-explain is: {topic}\n"));
        }
        p.push_str(
            "Give a NEW explanation of the same topic, using different words, \
             simpler terms, and fresh examples.\n\
             Do not define or discuss the phrase \"explain again\" and do not \
             restate the request.\n\
             Open with a transition phrase such as \"Let me explain this \
             differently...\" or \"Another way to understand this is...\" and go \
             straight into the explanation.\n\
             Stay on this exact topic; do not switch to anything else.\n",
        );
        if let Some(prev) = previous {
            p.push_str(&format!("Your previous explanation, for reference:\n{prev}\n"));
        }
        p.push_str(&format!("\nStudent request: {raw_text}\n"));
        p.push_str(STYLE_GUIDELINES);
        p
    }

    /// Follow-up prompt: continuity with the previous exchange, no topic
    /// switching.
    fn follow_up(&self, raw_text: &str, ctx: &ConversationContext) -> String {
        let mut p = String::with_capacity(1024);
        p.push_str(PERSONA_PREAMBLE);
        p.push_str(
            "\n\nThis is a follow-up to the ongoing conversation. Maintain \
             continuity with the previous exchange and stay on the same topic; \
             do not switch topics.\n\
             Acknowledge the student's answer when they gave one, with phrases \
             like \"That's right!\" or \"Let me clarify...\".\n",
        );
        if let Some(prev) = ctx.last_assistant_message() {
            p.push_str(&format!("Your last response was:\n{prev}\n"));
        }
        p.push_str(&format!("\nStudent: {raw_text}\n"));
        p.push_str(STYLE_GUIDELINES);
        p
    }

    /// Fresh-question prompt: persona plus up to the last few turns of
    /// history, oldest first.
    fn fresh(&self, raw_text: &str, ctx: &ConversationContext) -> String {
        let mut p = String::with_capacity(1024);
        p.push_str(PERSONA_PREAMBLE);
        p.push('\n');

        if !ctx.recent_messages.is_empty() {
            p.push_str("\nPrevious conversation:\n");
            let skip = ctx.recent_messages.len().saturating_sub(self.context_turns);
            for msg in ctx.recent_messages.iter().skip(skip) {
                let tag = match msg.role {
                    Role::Student => "Student",
                    Role::Assistant => "Sage",
                };
                p.push_str(&format!("{tag}: {}\n", msg.text));
            }
        }

        if let Some(topic) = ctx.current_topic.as_deref().filter(|t| !t.trim().is_empty()) {
            p.push_str(&format!("\nCurrent topic being discussed: {topic}\n"));
        }

        p.push_str(&format!("\nStudent question: {raw_text}\n"));
        p.push_str(STYLE_GUIDELINES);
        p
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Topic resolution
// ---------------------------------------------------------------------------

/// Resolve which topic an "explain again" request refers to.
///
/// Precedence:
/// 1. `ctx.current_topic`, when non-empty.
/// 2. `ctx.last_question`, when non-empty.
/// 3. Text following the literal word "about" in the first sentence of the
///    last assistant message.
/// 4. First hit from [`TOPIC_KEYWORDS`] anywhere in the last assistant
///    message.
/// 5. The first sentence of the last assistant message, verbatim.
///
/// Returns an empty string when nothing can be resolved (no previous
/// assistant message at all).
fn resolve_topic(ctx: &ConversationContext) -> String {
    if let Some(topic) = ctx.current_topic.as_deref() {
        if !topic.trim().is_empty() {
            return topic.trim().to_string();
        }
    }

    if let Some(question) = ctx.last_question.as_deref() {
        if !question.trim().is_empty() {
            return question.trim().to_string();
        }
    }

    let Some(last) = ctx.last_assistant_message() else {
        return String::new();
    };

    let first_sentence = last.split('.').next().unwrap_or("").trim();

    if let Some((_, after)) = first_sentence.split_once("about") {
        let after = after.trim();
        if !after.is_empty() {
            return after.to_string();
        }
    }

    let lower = last.to_lowercase();
    for keyword in TOPIC_KEYWORDS {
        if lower.contains(keyword) {
            return (*keyword).to_string();
        }
    }

    first_sentence.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    fn ctx_with_last_response(text: &str) -> ConversationContext {
        ConversationContext {
            last_response: Some(text.to_string()),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Topic resolution precedence
    // -----------------------------------------------------------------------

    #[test]
    fn current_topic_wins() {
        let mut ctx = ctx_with_last_response("We talked about algebra earlier.");
        ctx.current_topic = Some("fractions".into());
        ctx.last_question = Some("what is algebra".into());
        assert_eq!(resolve_topic(&ctx), "fractions");
    }

    #[test]
    fn empty_current_topic_is_skipped() {
        let mut ctx = ConversationContext::default();
        ctx.current_topic = Some("   ".into());
        ctx.last_question = Some("what is gravity".into());
        assert_eq!(resolve_topic(&ctx), "what is gravity");
    }

    #[test]
    fn about_extraction_from_first_sentence() {
        let ctx = ctx_with_last_response(
            "Let me tell you about the water cycle. It starts with evaporation.",
        );
        assert_eq!(resolve_topic(&ctx), "the water cycle");
    }

    #[test]
    fn keyword_scan_when_no_about() {
        let ctx = ctx_with_last_response(
            "Multiplication is repeated addition of the same number.",
        );
        // List order decides, not position in the message.
        assert_eq!(resolve_topic(&ctx), "addition");
    }

    #[test]
    fn first_sentence_fallback() {
        let ctx = ctx_with_last_response(
            "Photosynthesis converts light into chemical energy. Plants do it.",
        );
        assert_eq!(
            resolve_topic(&ctx),
            "Photosynthesis converts light into chemical energy"
        );
    }

    #[test]
    fn no_context_resolves_to_empty() {
        assert_eq!(resolve_topic(&ConversationContext::default()), "");
    }

    // -----------------------------------------------------------------------
    // Intent templates
    // -----------------------------------------------------------------------

    #[test]
    fn greeting_returns_fixed_text() {
        let builder = PromptBuilder::new();
        let prompt = builder.build("hi", Intent::Greeting, &ConversationContext::default());
        assert_eq!(prompt, GREETING_TEXT);
    }

    #[test]
    fn explain_again_prompt_never_defines_the_phrase() {
        let builder = PromptBuilder::new();
        let ctx = ctx_with_last_response("Photosynthesis converts light into chemical energy.");
        let prompt = builder.build("explain again", Intent::ExplainAgain, &ctx);

        assert!(!prompt.to_lowercase().contains("explain again means"));
        assert!(prompt.contains("Photosynthesis converts light into chemical energy"));
        assert!(prompt.contains("transition phrase"));
    }

    #[test]
    fn explain_again_embeds_resolved_topic() {
        let builder = PromptBuilder::new();
        let mut ctx = ConversationContext::default();
        ctx.current_topic = Some("fractions".into());
        let prompt = builder.build("one more time", Intent::ExplainAgain, &ctx);
        assert!(prompt.contains("The topic to re-explain is: fractions"));
    }

    #[test]
    fn follow_up_embeds_last_reply_and_forbids_switching() {
        let builder = PromptBuilder::new();
        let ctx = ctx_with_last_response("Addition combines two numbers into a sum.");
        let prompt = builder.build("why?", Intent::FollowUp, &ctx);
        assert!(prompt.contains("Addition combines two numbers into a sum."));
        assert!(prompt.contains("do not switch topics"));
        assert!(prompt.contains("Student: why?"));
    }

    #[test]
    fn fresh_prompt_embeds_last_five_turns_in_order() {
        let builder = PromptBuilder::new();
        let mut ctx = ConversationContext::default();
        for i in 0..7 {
            ctx.recent_messages.push(Message::student(format!("q{i}")));
        }
        let prompt = builder.build("next question", Intent::Fresh, &ctx);

        // Oldest two are dropped, the remaining five appear oldest→newest.
        assert!(!prompt.contains("q0"));
        assert!(!prompt.contains("q1"));
        let p2 = prompt.find("q2").unwrap();
        let p6 = prompt.find("q6").unwrap();
        assert!(p2 < p6);
    }

    #[test]
    fn fresh_prompt_tags_roles() {
        let builder = PromptBuilder::new();
        let mut ctx = ConversationContext::default();
        ctx.recent_messages.push(Message::student("what is two plus two"));
        ctx.recent_messages.push(Message::assistant("Two plus two is four."));
        let prompt = builder.build("and times two?", Intent::Fresh, &ctx);
        assert!(prompt.contains("Student: what is two plus two"));
        assert!(prompt.contains("Sage: Two plus two is four."));
    }

    #[test]
    fn every_generation_prompt_carries_style_guidelines() {
        let builder = PromptBuilder::new();
        let ctx = ctx_with_last_response("Gravity pulls objects together.");
        for intent in [Intent::ExplainAgain, Intent::FollowUp, Intent::Fresh] {
            let prompt = builder.build("tell me more", intent, &ctx);
            assert!(
                prompt.contains("Style guidelines:"),
                "missing style block for {intent:?}"
            );
            assert!(prompt.contains("2-3 sentences"));
            assert!(prompt.contains("4-6 sentences"));
        }
    }

    // -----------------------------------------------------------------------
    // Auxiliary call sites
    // -----------------------------------------------------------------------

    #[test]
    fn practice_questions_prompt_interpolates_topic() {
        let builder = PromptBuilder::new();
        let prompt = builder.practice_questions("volcanoes");
        assert!(prompt.contains("5 practice questions about volcanoes"));
        assert!(prompt.contains("numbered list"));
    }

    #[test]
    fn study_notes_prompt_names_sections() {
        let builder = PromptBuilder::new();
        let prompt = builder.study_notes("photosynthesis");
        assert!(prompt.contains("\"photosynthesis\""));
        assert!(prompt.contains("Key Points"));
        assert!(prompt.contains("Visual Description"));
    }
}
