//! Speech synthesis pipeline
//!
//! Remote voice providers tried in order, with a directive telling the caller to
//! synthesize locally when none of them succeeds.

pub mod tts;

pub use tts::{
    ElevenLabsConfig, ElevenLabsProvider, FailureClass, SpeechFallbackChain, SpeechOutcome,
    SpeechProvider, SynthesizedAudio,
};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: HTTP {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Network(err.to_string())
    }
}
