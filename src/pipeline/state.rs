//! Per-request phase tracking.
//!
//! Every request walks the same phase sequence and always reaches
//! `Responded`, even when generation was satisfied by canned text.  Phases
//! exist for logging and tests; no state is kept across requests.

/// Phases of one conversational request, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Classified,
    PromptBuilt,
    Generated,
    PostProcessed,
    Responded,
}

impl RequestPhase {
    pub fn label(&self) -> &'static str {
        match self {
            RequestPhase::Received => "received",
            RequestPhase::Classified => "classified",
            RequestPhase::PromptBuilt => "prompt_built",
            RequestPhase::Generated => "generated",
            RequestPhase::PostProcessed => "post_processed",
            RequestPhase::Responded => "responded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(RequestPhase::Received.label(), "received");
        assert_eq!(RequestPhase::Responded.label(), "responded");
    }
}
