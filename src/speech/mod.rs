//! Speech input/output: text-to-speech with client fallback, and the
//! speech-recognition collaborator boundary.

pub mod recognition;
pub mod synthesis;

pub use recognition::{RecognitionError, Transcriber};
pub use synthesis::{
    ApiSynthesizer, ClientTtsDirective, SpeechError, SpeechOutput, SpeechService,
    SpeechSynthesizer, VoiceParams,
};
