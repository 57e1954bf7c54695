//! Text-to-speech
//!
//! - `SpeechProvider`: one remote synthesis service
//! - `ElevenLabsProvider`: the primary voice
//! - `SpeechFallbackChain`: ordered providers ending in a local-synthesis directive

mod elevenlabs;
mod fallback;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsProvider};
pub use fallback::{FailureClass, SpeechFallbackChain, SpeechOutcome};

use async_trait::async_trait;

use crate::PipelineError;

/// Encoded audio returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl SynthesizedAudio {
    pub fn mpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: voice_avatar_core::AUDIO_MPEG.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Remote speech synthesis backend
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` into encoded audio
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, PipelineError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
