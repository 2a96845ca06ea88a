//! The per-request orchestrator.
//!
//! One request flows through classify → prompt → generate → post-process,
//! sequentially, on its own task.  Nothing here is shared mutable state, so
//! any number of requests run concurrently without coordination.
//!
//! Failure never reaches the caller raw: every path ends in a reply with
//! non-empty text, falling back to canned responses when providers,
//! recognizers, or the per-request deadline give out.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, PipelineConfig};
use crate::conversation::{ConversationContext, GenerationRequest, TranscribedReply, TutorReply};
use crate::intent::{self, Intent};
use crate::pipeline::canned;
use crate::pipeline::state::RequestPhase;
use crate::postprocess::{emotion, notes, EmotionTag};
use crate::prompt::PromptBuilder;
use crate::provider::{FallbackChain, ProviderRegistry, RetryPolicy};
use crate::speech::{ClientTtsDirective, SpeechOutput, SpeechService, Transcriber, VoiceParams};
use crate::vision::OcrEngine;

// ---------------------------------------------------------------------------
// RequestOrchestrator
// ---------------------------------------------------------------------------

/// Composes the whole pipeline for each incoming request.
///
/// Constructed once at process start from a [`ProviderRegistry`] and shared
/// across request tasks behind an `Arc`.
pub struct RequestOrchestrator {
    chain: Arc<FallbackChain>,
    prompts: PromptBuilder,
    speech: SpeechService,
    transcriber: Option<Arc<dyn Transcriber>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    deadline: Duration,
    text_retry: RetryPolicy,
    note_retry: RetryPolicy,
}

impl RequestOrchestrator {
    /// Minimum usable completion length on the conversational path.
    const MIN_TEXT_LEN: usize = 1;
    /// Auxiliary calls demand a little substance before trusting the result.
    const MIN_AUX_LEN: usize = 10;

    pub fn new(chain: Arc<FallbackChain>, speech: SpeechService, pipeline: &PipelineConfig) -> Self {
        Self {
            chain,
            prompts: PromptBuilder::with_context_turns(pipeline.context_turns),
            speech,
            transcriber: None,
            ocr: None,
            deadline: Duration::from_secs(pipeline.request_deadline_secs),
            text_retry: RetryPolicy::text_generation(),
            note_retry: RetryPolicy::note_generation(),
        }
    }

    /// Wire everything from configuration in one step.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = ProviderRegistry::from_config(config);
        let speech = SpeechService::new(registry.synthesizer(), VoiceParams::from(&config.speech));
        Self::new(registry.chain(), speech, &config.pipeline)
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    // -----------------------------------------------------------------------
    // Conversational path
    // -----------------------------------------------------------------------

    /// Process one conversational request end to end.
    ///
    /// Always returns a reply with non-empty text; past the per-request
    /// deadline the reply is the canned trouble text instead of whatever the
    /// providers were still retrying on.
    pub async fn process(&self, request: GenerationRequest) -> TutorReply {
        match tokio::time::timeout(self.deadline, self.process_inner(&request)).await {
            Ok(reply) => reply,
            Err(_) => {
                log::error!(
                    "pipeline: request for user '{}' exceeded the {:?} deadline",
                    request.user_id,
                    self.deadline
                );
                self.trouble_reply()
            }
        }
    }

    async fn process_inner(&self, request: &GenerationRequest) -> TutorReply {
        self.trace(RequestPhase::Received, request);

        let intent = intent::classify(&request.raw_text, &request.context);
        self.trace(RequestPhase::Classified, request);

        let prompt = self.prompts.build(&request.raw_text, intent, &request.context);
        self.trace(RequestPhase::PromptBuilt, request);

        let text = if intent == Intent::Greeting {
            // The prompt already is the fixed greeting; no provider call.
            prompt
        } else {
            match self
                .chain
                .generate(&prompt, Self::MIN_TEXT_LEN, &self.text_retry)
                .await
            {
                Ok(text) => text,
                Err(err) => {
                    log::error!("pipeline: all providers failed, using canned text: {err}");
                    canned::GENERATION_TROUBLE_TEXT.to_string()
                }
            }
        };
        self.trace(RequestPhase::Generated, request);

        let notes = if intent == Intent::Greeting {
            None
        } else {
            self.study_notes(&request.raw_text, request, &text).await
        };

        let emotion = if intent == Intent::Greeting {
            EmotionTag::Happy
        } else {
            emotion::classify(&request.raw_text, &text)
        };
        self.trace(RequestPhase::PostProcessed, request);

        let speech = self.speech.speak(&text).await;
        self.trace(RequestPhase::Responded, request);

        TutorReply {
            text,
            emotion,
            notes,
            speech,
        }
    }

    /// Best-effort note generation: ask the providers for structured notes
    /// on the topic, extract from whatever comes back, and on failure
    /// extract from the reply text itself.  Never fails the request.
    async fn study_notes(
        &self,
        raw_text: &str,
        request: &GenerationRequest,
        response_text: &str,
    ) -> Option<notes::StructuredNotes> {
        if !notes::is_learning_question(raw_text) {
            return None;
        }

        let topic = request
            .context
            .current_topic
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(raw_text);

        let prompt = self.prompts.study_notes(topic);
        match self
            .chain
            .generate(&prompt, Self::MIN_AUX_LEN, &self.note_retry)
            .await
        {
            Ok(markdown) => notes::extract(&markdown),
            Err(err) => {
                log::warn!("pipeline: note generation failed, extracting from reply: {err}");
                notes::extract(response_text)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Voice / image input
    // -----------------------------------------------------------------------

    /// Transcribe audio and run the conversational path on the transcript.
    pub async fn process_voice(
        &self,
        audio: &[u8],
        user_id: &str,
        context: ConversationContext,
    ) -> TranscribedReply {
        let Some(transcriber) = &self.transcriber else {
            log::warn!("pipeline: voice input with no transcriber configured");
            return self.unrecognized_reply(canned::RECOGNITION_UNAVAILABLE_TEXT);
        };

        match transcriber.transcribe(audio).await {
            Ok(transcript) if !transcript.trim().is_empty() => {
                let request =
                    GenerationRequest::new(transcript.clone(), user_id).with_context(context);
                let reply = self.process(request).await;
                TranscribedReply { transcript, reply }
            }
            Ok(_) => self.unrecognized_reply(canned::RECOGNITION_UNAVAILABLE_TEXT),
            Err(err) => {
                log::error!("pipeline: transcription failed: {err}");
                self.unrecognized_reply(canned::RECOGNITION_UNAVAILABLE_TEXT)
            }
        }
    }

    /// OCR an image and run the conversational path on the extracted text.
    pub async fn process_image(
        &self,
        image: &[u8],
        user_id: &str,
        context: ConversationContext,
    ) -> TranscribedReply {
        let Some(ocr) = &self.ocr else {
            log::warn!("pipeline: image input with no ocr engine configured");
            return self.unrecognized_reply(canned::OCR_UNAVAILABLE_TEXT);
        };

        match ocr.extract_text(image).await {
            Ok(text) if !text.trim().is_empty() => {
                let request = GenerationRequest::new(text.clone(), user_id).with_context(context);
                let reply = self.process(request).await;
                TranscribedReply {
                    transcript: text,
                    reply,
                }
            }
            Ok(_) => self.unrecognized_reply(canned::OCR_UNAVAILABLE_TEXT),
            Err(err) => {
                log::error!("pipeline: ocr failed: {err}");
                self.unrecognized_reply(canned::OCR_UNAVAILABLE_TEXT)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Auxiliary endpoints (best effort, canned on failure)
    // -----------------------------------------------------------------------

    /// Practice questions for a topic.  Falls back to the five-item canned
    /// template; never fails.
    pub async fn practice_questions(&self, topic: &str) -> String {
        let prompt = self.prompts.practice_questions(topic);
        match self
            .chain
            .generate(&prompt, Self::MIN_AUX_LEN, &self.note_retry)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                log::warn!("pipeline: practice questions failed, using template: {err}");
                canned::practice_questions(topic)
            }
        }
    }

    /// Suggest a follow-on topic.  A generated suggestion is only trusted
    /// when it looks like a bare topic name; otherwise the curated pairing
    /// table answers.  Never fails.
    pub async fn suggest_topic(&self, topic: &str) -> String {
        let prompt = self.prompts.suggest_topic(topic);
        match self
            .chain
            .generate(&prompt, 3, &self.note_retry)
            .await
        {
            Ok(text) => {
                let suggestion = text.trim().trim_matches('"').to_string();
                let len = suggestion.chars().count();
                if (3..=100).contains(&len) {
                    suggestion
                } else {
                    log::warn!("pipeline: implausible topic suggestion ({len} chars), using table");
                    canned::related_topic(topic)
                }
            }
            Err(err) => {
                log::warn!("pipeline: topic suggestion failed, using table: {err}");
                canned::related_topic(topic)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Canned replies
    // -----------------------------------------------------------------------

    fn trouble_reply(&self) -> TutorReply {
        TutorReply {
            text: canned::TROUBLE_TEXT.to_string(),
            emotion: EmotionTag::Concerned,
            notes: None,
            speech: SpeechOutput::ClientFallback(ClientTtsDirective::for_text(
                canned::TROUBLE_TEXT,
            )),
        }
    }

    fn unrecognized_reply(&self, text: &str) -> TranscribedReply {
        TranscribedReply {
            transcript: String::new(),
            reply: TutorReply {
                text: text.to_string(),
                emotion: EmotionTag::Concerned,
                notes: None,
                speech: SpeechOutput::ClientFallback(ClientTtsDirective::for_text(text)),
            },
        }
    }

    fn trace(&self, phase: RequestPhase, request: &GenerationRequest) {
        log::debug!(
            "pipeline: user '{}' phase {}",
            request.user_id,
            phase.label()
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
