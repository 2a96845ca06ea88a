//! Secondary artifacts derived from generated text: emotion tags and
//! structured study notes.  Speech synthesis lives in [`crate::speech`].

pub mod emotion;
pub mod notes;

pub use emotion::EmotionTag;
pub use notes::{StructuredNotes, MAX_KEY_POINTS};
