//! Sage Tutor: orchestration core for an AI tutoring backend.
//!
//! Takes text, voice, or image input from a client, classifies the intent,
//! builds a context-aware prompt, generates a reply through a chain of
//! interchangeable LLM providers (with bounded retry on rate limits and
//! fallback between providers), and derives secondary artifacts from the
//! reply: an emotion tag, structured study notes, and speech audio with a
//! client-side synthesis fallback.
//!
//! HTTP routing, credential loading and the raw provider services live
//! outside this crate; the entry point here is
//! [`pipeline::RequestOrchestrator`].
//!
//! ```rust,no_run
//! use sage_tutor::config::AppConfig;
//! use sage_tutor::conversation::GenerationRequest;
//! use sage_tutor::pipeline::RequestOrchestrator;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::load()?;
//! let orchestrator = RequestOrchestrator::from_config(&config);
//!
//! let reply = orchestrator
//!     .process(GenerationRequest::new("What is photosynthesis?", "user-1"))
//!     .await;
//! println!("{} [{}]", reply.text, reply.emotion.label());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod intent;
pub mod pipeline;
pub mod postprocess;
pub mod prompt;
pub mod provider;
pub mod speech;
pub mod store;
pub mod vision;

pub use conversation::{ConversationContext, GenerationRequest, TranscribedReply, TutorReply};
pub use pipeline::RequestOrchestrator;
pub use postprocess::EmotionTag;
