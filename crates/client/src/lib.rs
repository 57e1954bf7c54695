//! Voice avatar client
//!
//! Features:
//! - HTTP client for the dialogue and voice endpoints
//! - Rolling context persisted in a key-value store
//! - Queued playback with remote voice first and local synthesis second
//! - Lipsync frames while speech plays
//! - Turn-taking state machine driving recognition, replies and playback
//!
//! Platform capabilities (audio output, local synthesis, speech recognition,
//! persistence) are traits so the controller runs the same against a browser
//! bridge, a desktop backend or test doubles.

pub mod api;
pub mod config;
pub mod context;
pub mod controller;
pub mod events;
pub mod lipsync;
pub mod playback;
pub mod recognition;
pub mod storage;

pub use api::{DialogueApi, HttpDialogueClient, VoiceReply};
pub use config::{ClientConfig, StatusTexts};
pub use context::LocalContext;
pub use controller::{ControllerState, TurnTakingController};
pub use events::ControllerEvent;
pub use lipsync::{LipsyncAnimator, LipsyncFrame};
pub use playback::{AudioPlayer, LocalSynthesizer, PlaybackController, VoiceStrategy};
pub use recognition::{RecognitionOutcome, SpeechRecognizer};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};

use thiserror::Error;

/// Client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    #[error("Busy: {0}")]
    Busy(String),
}

impl ClientError {
    /// Failures where the server could not be reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}
