//! Request orchestration: phase tracking, canned fallbacks and the
//! per-request pipeline.

pub mod canned;
pub mod orchestrator;
pub mod state;

pub use orchestrator::RequestOrchestrator;
pub use state::RequestPhase;
