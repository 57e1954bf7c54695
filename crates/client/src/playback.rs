//! Speech playback
//!
//! Every utterance goes through an ordered list of voice strategies: the remote
//! voice first, then local synthesis. Utterances are queued so at most one plays
//! at a time, and each playback is wrapped in exactly one lipsync start/stop.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use crate::api::{DialogueApi, VoiceReply};
use crate::events::ControllerEvent;
use crate::lipsync::LipsyncAnimator;
use crate::ClientError;

/// Audio output device
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play encoded audio, resolving when playback ends
    async fn play(&self, audio: &[u8], mime: &str) -> Result<(), ClientError>;
}

/// Platform speech synthesis
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    /// Speak `text`, resolving when speech ends
    async fn speak(&self, text: &str, language: &str) -> Result<(), ClientError>;
}

/// One way of turning text into sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStrategy {
    /// Server voice endpoint
    Remote,
    /// Platform synthesis
    Local,
}

impl VoiceStrategy {
    pub fn default_order() -> Vec<VoiceStrategy> {
        vec![VoiceStrategy::Remote, VoiceStrategy::Local]
    }
}

/// What happened to a remote attempt
enum RemoteAttempt {
    Played,
    /// Continue with the next strategy, speaking this text
    Next(String),
}

/// Queued playback over the configured voice strategies
pub struct PlaybackController {
    api: Arc<dyn DialogueApi>,
    player: Arc<dyn AudioPlayer>,
    synthesizer: Arc<dyn LocalSynthesizer>,
    strategies: Vec<VoiceStrategy>,
    language: String,
    lipsync: LipsyncAnimator,
    event_tx: broadcast::Sender<ControllerEvent>,
    queue: Mutex<()>,
}

impl PlaybackController {
    pub fn new(
        api: Arc<dyn DialogueApi>,
        player: Arc<dyn AudioPlayer>,
        synthesizer: Arc<dyn LocalSynthesizer>,
        language: impl Into<String>,
        lipsync: LipsyncAnimator,
        event_tx: broadcast::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            api,
            player,
            synthesizer,
            strategies: VoiceStrategy::default_order(),
            language: language.into(),
            lipsync,
            event_tx,
            queue: Mutex::new(()),
        }
    }

    /// Replace the strategy order
    pub fn with_strategies(mut self, strategies: Vec<VoiceStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Speak `text`, waiting for any playback already in progress
    ///
    /// Resolves when this utterance has finished playing.
    pub async fn speak(&self, text: &str) -> Result<(), ClientError> {
        let _turn = self.queue.lock().await;

        let mut text = text.to_string();
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy {
                VoiceStrategy::Remote => match self.try_remote(&text).await {
                    Ok(RemoteAttempt::Played) => return Ok(()),
                    Ok(RemoteAttempt::Next(fallback_text)) => text = fallback_text,
                    Err(e) => {
                        tracing::warn!("Remote voice failed: {}", e);
                        let _ = self.event_tx.send(ControllerEvent::Error(e.to_string()));
                        return Err(e);
                    },
                },
                VoiceStrategy::Local => {
                    match self.with_lipsync(self.synthesizer.speak(&text, &self.language)).await {
                        Ok(()) => return Ok(()),
                        Err(e) => {
                            tracing::warn!("Local synthesis failed: {}", e);
                            last_error = Some(e);
                        },
                    }
                },
            }
        }

        let err = last_error
            .unwrap_or_else(|| ClientError::Playback("no voice strategy succeeded".to_string()));
        let _ = self.event_tx.send(ControllerEvent::Error(err.to_string()));
        Err(err)
    }

    /// Remote voice: audio plays here; a directive or an unreachable server moves
    /// on to the next strategy; any other server failure stops the chain.
    async fn try_remote(&self, text: &str) -> Result<RemoteAttempt, ClientError> {
        match self.api.synthesize(text).await {
            Ok(VoiceReply::Audio { bytes, mime }) => {
                match self.with_lipsync(self.player.play(&bytes, &mime)).await {
                    Ok(()) => Ok(RemoteAttempt::Played),
                    Err(e) => {
                        tracing::warn!("Audio playback failed, trying next voice: {}", e);
                        Ok(RemoteAttempt::Next(text.to_string()))
                    },
                }
            },
            Ok(VoiceReply::Fallback(directive)) => {
                tracing::info!(target_voice = %directive.fallback, "Using local synthesis");
                Ok(RemoteAttempt::Next(directive.text))
            },
            Err(e) if e.is_network() => {
                tracing::warn!("Voice endpoint unreachable, using local synthesis: {}", e);
                Ok(RemoteAttempt::Next(text.to_string()))
            },
            Err(e) => Err(e),
        }
    }

    async fn with_lipsync<F>(&self, playback: F) -> Result<(), ClientError>
    where
        F: std::future::Future<Output = Result<(), ClientError>>,
    {
        self.lipsync.start();
        let result = playback.await;
        self.lipsync.stop();
        result
    }
}
