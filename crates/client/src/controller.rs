//! Turn-taking controller
//!
//! State machine for one avatar conversation:
//!
//! ```text
//! Idle -> Greeting -> Listening -> Processing -> Speaking -> Listening ...
//! ```
//!
//! Activating the microphone speaks a greeting and only then starts listening.
//! Each final utterance is answered and spoken; in continuous mode listening
//! resumes after a short pause. Typed text and the devotional prompt take a
//! one-shot path that bypasses recognition.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use voice_avatar_core::{Turn, TurnRole};

use crate::api::DialogueApi;
use crate::config::ClientConfig;
use crate::context::LocalContext;
use crate::events::ControllerEvent;
use crate::lipsync::LipsyncAnimator;
use crate::playback::{AudioPlayer, LocalSynthesizer, PlaybackController, VoiceStrategy};
use crate::recognition::{RecognitionOutcome, SpeechRecognizer};
use crate::storage::KeyValueStore;
use crate::ClientError;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    #[default]
    Idle,
    /// Speaking the greeting before the first listen
    Greeting,
    Listening,
    /// Waiting for the reply
    Processing,
    Speaking,
}

/// Turn-taking controller
///
/// Cheap to clone; clones share the same conversation.
#[derive(Clone)]
pub struct TurnTakingController {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    api: Arc<dyn DialogueApi>,
    recognizer: Arc<dyn SpeechRecognizer>,
    playback: PlaybackController,
    context: parking_lot::Mutex<LocalContext>,
    state: RwLock<ControllerState>,
    /// Continuous listening mode
    listening: AtomicBool,
    /// Incremented on every activation so a stale session loop stops
    generation: AtomicU64,
    devotional_active: AtomicBool,
    session: parking_lot::Mutex<Option<JoinHandle<()>>>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl TurnTakingController {
    pub fn new(
        config: ClientConfig,
        api: Arc<dyn DialogueApi>,
        recognizer: Arc<dyn SpeechRecognizer>,
        player: Arc<dyn AudioPlayer>,
        synthesizer: Arc<dyn LocalSynthesizer>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_strategies(
            config,
            api,
            recognizer,
            player,
            synthesizer,
            store,
            VoiceStrategy::default_order(),
        )
    }

    /// Create a controller with an explicit voice strategy order
    pub fn with_strategies(
        config: ClientConfig,
        api: Arc<dyn DialogueApi>,
        recognizer: Arc<dyn SpeechRecognizer>,
        player: Arc<dyn AudioPlayer>,
        synthesizer: Arc<dyn LocalSynthesizer>,
        store: Arc<dyn KeyValueStore>,
        strategies: Vec<VoiceStrategy>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);

        let lipsync = LipsyncAnimator::new(config.lipsync_interval(), event_tx.clone());
        let playback = PlaybackController::new(
            Arc::clone(&api),
            player,
            synthesizer,
            config.language.clone(),
            lipsync,
            event_tx.clone(),
        )
        .with_strategies(strategies);

        let context = LocalContext::load(store, config.storage_key.clone(), config.max_turns);

        Self {
            inner: Arc::new(Inner {
                config,
                api,
                recognizer,
                playback,
                context: parking_lot::Mutex::new(context),
                state: RwLock::new(ControllerState::Idle),
                listening: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                devotional_active: AtomicBool::new(false),
                session: parking_lot::Mutex::new(None),
                event_tx,
            }),
        }
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.inner.event_tx.subscribe()
    }

    pub async fn state(&self) -> ControllerState {
        *self.inner.state.read().await
    }

    /// Whether continuous listening mode is on
    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::SeqCst)
    }

    /// Client copy of the context, oldest first
    pub fn local_context(&self) -> Vec<Turn> {
        self.inner.context.lock().turns()
    }

    /// Turn the microphone on or off
    pub async fn toggle_microphone(&self) -> Result<(), ClientError> {
        if self.is_listening() {
            self.deactivate().await
        } else {
            self.activate().await
        }
    }

    /// Start continuous listening
    ///
    /// Speaks the greeting, then listens. Returns once the session is spawned.
    pub async fn activate(&self) -> Result<(), ClientError> {
        let inner = &self.inner;

        if !inner.recognizer.is_supported() {
            inner.status(&inner.config.status.unsupported);
            return Err(ClientError::RecognitionUnavailable(
                "speech recognition is not supported".to_string(),
            ));
        }
        if inner.devotional_active.load(Ordering::SeqCst) {
            return Err(ClientError::Busy("devotional in progress".to_string()));
        }
        if inner.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation, "Microphone activated");

        inner.set_state(ControllerState::Greeting).await;
        inner.status(&inner.config.status.connecting);

        let session = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            session.run_session(generation).await;
        });
        *inner.session.lock() = Some(handle);

        Ok(())
    }

    /// Stop listening and say goodbye
    ///
    /// Requests already in flight are not cancelled. A reply still pending is
    /// spoken after the farewell, since playback is queued in call order.
    pub async fn deactivate(&self) -> Result<(), ClientError> {
        let inner = &self.inner;

        if !inner.listening.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Microphone deactivated");

        inner.recognizer.stop();
        inner.set_state(ControllerState::Idle).await;
        inner.status(&inner.config.status.ended);

        if let Err(e) = inner.playback.speak(&inner.config.farewell).await {
            tracing::warn!("Farewell playback failed: {}", e);
        }
        Ok(())
    }

    /// Answer typed text
    ///
    /// The text is trimmed; blank input is ignored and returns `None`.
    pub async fn submit_text(&self, text: &str) -> Result<Option<String>, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let inner = &self.inner;
        inner.emit(ControllerEvent::UserMessage(text.to_string()));
        let reply = inner.respond(text).await;
        inner.finish_one_shot().await;

        Ok(Some(reply))
    }

    /// Ask for a short devotional and speak it
    ///
    /// Refused while continuous listening is on or another devotional runs.
    pub async fn devotional(&self) -> Result<String, ClientError> {
        let inner = &self.inner;

        if self.is_listening() {
            return Err(ClientError::Busy("microphone is active".to_string()));
        }
        if inner.devotional_active.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy("devotional in progress".to_string()));
        }

        let _active = DevotionalGuard(&inner.devotional_active);

        inner.status(&inner.config.status.devotional_preparing);
        let reply = inner.respond(&inner.config.devotional_prompt).await;
        inner.finish_one_shot().await;
        inner.status(&inner.config.status.devotional_done);

        Ok(reply)
    }

    /// Clear both the server and the local context
    pub async fn reset_conversation(&self) -> Result<(), ClientError> {
        let inner = &self.inner;

        let local = inner.context.lock().reset();
        let remote = inner.api.reset().await;

        if let Err(ref e) = remote {
            inner.emit(ControllerEvent::Error(e.to_string()));
        }
        tracing::info!("Conversation reset");

        local.and(remote)
    }

    /// Wait for the current listening session task to finish
    pub async fn join_session(&self) {
        let handle = self.inner.session.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// Clears the devotional flag when the request ends or is dropped
struct DevotionalGuard<'a>(&'a AtomicBool);

impl Drop for DevotionalGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Inner {
    fn emit(&self, event: ControllerEvent) {
        let _ = self.event_tx.send(event);
    }

    fn status(&self, text: &str) {
        tracing::debug!(status = text, "Status");
        self.emit(ControllerEvent::Status(text.to_string()));
    }

    async fn set_state(&self, new_state: ControllerState) {
        let old_state = {
            let mut state = self.state.write().await;
            let old = *state;
            *state = new_state;
            old
        };

        if old_state != new_state {
            tracing::debug!(?old_state, ?new_state, "State changed");
            self.emit(ControllerEvent::StateChanged {
                old: old_state,
                new: new_state,
            });
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.listening.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Greeting, then the listen loop, for one activation
    async fn run_session(self: Arc<Self>, generation: u64) {
        if let Err(e) = self.playback.speak(&self.config.greeting).await {
            tracing::warn!("Greeting playback failed: {}", e);
        }

        if self.is_current(generation) {
            self.set_state(ControllerState::Listening).await;
            self.status(&self.config.status.listening);
            self.listen_loop(generation).await;
        }

        if !self.listening.load(Ordering::SeqCst) {
            self.set_state(ControllerState::Idle).await;
        }
        tracing::debug!(generation, "Listening session finished");
    }

    async fn listen_loop(&self, generation: u64) {
        while self.is_current(generation) {
            let outcome = self.recognizer.recognize(&self.config.language).await;
            if !self.is_current(generation) {
                break;
            }

            match outcome {
                RecognitionOutcome::Utterance(text) => {
                    if text.trim().is_empty() {
                        tokio::time::sleep(self.config.ended_restart_delay()).await;
                        continue;
                    }
                    self.emit(ControllerEvent::UserMessage(text.clone()));
                    self.status(&self.config.status.thinking);
                    self.respond(&text).await;

                    if !self.is_current(generation) {
                        break;
                    }
                    tokio::time::sleep(self.config.resume_delay()).await;
                    if !self.is_current(generation) {
                        break;
                    }
                    self.set_state(ControllerState::Listening).await;
                    self.status(&self.config.status.listening_again);
                },
                RecognitionOutcome::NoSpeech => {
                    self.status(&self.config.status.no_speech);
                    tokio::time::sleep(self.config.no_speech_delay()).await;
                },
                RecognitionOutcome::Ended => {
                    tracing::debug!("Recognizer ended, restarting");
                    tokio::time::sleep(self.config.ended_restart_delay()).await;
                },
                RecognitionOutcome::Error(message) => {
                    tracing::warn!("Recognition error: {}", message);
                    self.emit(ControllerEvent::Error(message));
                    break;
                },
            }
        }
    }

    /// Processing and Speaking for one user message; returns the reply
    async fn respond(&self, message: &str) -> String {
        self.set_state(ControllerState::Processing).await;
        self.emit(ControllerEvent::Typing(true));

        let reply = self.ask(message).await;

        self.emit(ControllerEvent::Typing(false));
        self.emit(ControllerEvent::AssistantMessage(reply.clone()));

        self.set_state(ControllerState::Speaking).await;
        if let Err(e) = self.playback.speak(&reply).await {
            tracing::warn!("Reply playback failed: {}", e);
        }

        reply
    }

    /// Ask the server, recording both turns in the local context
    async fn ask(&self, message: &str) -> String {
        self.remember(TurnRole::User, message);

        let reply = match self.api.ask(message).await {
            Ok(Some(text)) => text,
            Ok(None) => self.config.fallback_reply.clone(),
            Err(e) => {
                tracing::warn!("Reply request failed: {}", e);
                self.emit(ControllerEvent::Error(e.to_string()));
                self.config.fallback_reply.clone()
            },
        };

        self.remember(TurnRole::Assistant, &reply);
        reply
    }

    fn remember(&self, role: TurnRole, text: &str) {
        if let Err(e) = self.context.lock().append(role, text) {
            tracing::warn!("Failed to persist local context: {}", e);
        }
    }

    /// One-shot turns end idle unless continuous listening took over
    async fn finish_one_shot(&self) {
        let next = if self.listening.load(Ordering::SeqCst) {
            ControllerState::Listening
        } else {
            ControllerState::Idle
        };
        self.set_state(next).await;
    }
}
