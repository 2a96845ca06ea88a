//! Conversation data model shared across the pipeline.
//!
//! The caller owns one [`ConversationContext`] per session, sends it with
//! every request, and merges the reply back into it.  The backend keeps no
//! session state of its own; persistence, when wanted, goes through the
//! [`ProgressStore`](crate::store::ProgressStore) collaborator.

use serde::{Deserialize, Serialize};

use crate::postprocess::{EmotionTag, StructuredNotes};
use crate::speech::SpeechOutput;

// ---------------------------------------------------------------------------
// Role / Message
// ---------------------------------------------------------------------------

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner typing or speaking to the tutor.
    Student,
    /// A previous tutor reply.
    Assistant,
}

/// A single turn of the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn student(text: impl Into<String>) -> Self {
        Self {
            role: Role::Student,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationContext
// ---------------------------------------------------------------------------

/// Caller-supplied conversational state, echoed back per request.
///
/// All fields are optional in the wire format; a fresh conversation is the
/// `Default` value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationContext {
    /// Recent turns, oldest first.  Only the newest few are ever embedded in
    /// a prompt.
    pub recent_messages: Vec<Message>,
    /// Topic currently being discussed, when the caller tracks one.
    pub current_topic: Option<String>,
    /// Topic discussed before the current one.
    pub previous_topic: Option<String>,
    /// The student's last question, verbatim.
    pub last_question: Option<String>,
    /// The tutor's last reply, verbatim.
    pub last_response: Option<String>,
    /// Caller-side detection: this request continues the previous exchange.
    pub is_follow_up: bool,
    /// Caller-side detection: the student asked for a re-explanation.
    pub is_explain_again: bool,
}

impl ConversationContext {
    /// The newest assistant turn, falling back to `last_response` when the
    /// message history carries none.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.recent_messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.text.as_str())
            .or(self.last_response.as_deref())
    }
}

// ---------------------------------------------------------------------------
// GenerationRequest
// ---------------------------------------------------------------------------

/// One incoming conversational request.  Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub raw_text: String,
    pub user_id: String,
    pub context: ConversationContext,
}

impl GenerationRequest {
    pub fn new(raw_text: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            user_id: user_id.into(),
            context: ConversationContext::default(),
        }
    }

    pub fn with_context(mut self, context: ConversationContext) -> Self {
        self.context = context;
        self
    }
}

// ---------------------------------------------------------------------------
// TutorReply
// ---------------------------------------------------------------------------

/// The structured result returned for every conversational request.
///
/// Invariant: `text` is never empty: when every provider fails, canned text
/// is substituted before this struct is built.
#[derive(Debug, Clone)]
pub struct TutorReply {
    /// The generated (or canned) response text.
    pub text: String,
    /// Rule-derived emotion tag for the avatar/voice layer.
    pub emotion: EmotionTag,
    /// Best-effort study notes; `None` when the question was not a learning
    /// question or note generation failed.
    pub notes: Option<StructuredNotes>,
    /// Server audio or a client-side synthesis directive.
    pub speech: SpeechOutput,
}

/// A reply to voice or image input, carrying the recognized text alongside
/// the tutor's answer so the UI can display what was understood.
#[derive(Debug, Clone)]
pub struct TranscribedReply {
    /// What the recognizer extracted from the audio/image.
    pub transcript: String,
    pub reply: TutorReply,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
