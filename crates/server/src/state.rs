//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use voice_avatar_agent::DialogueOrchestrator;
use voice_avatar_config::Settings;
use voice_avatar_llm::{GeminiBackend, GeminiConfig, LlmBackend};
use voice_avatar_pipeline::{
    ElevenLabsConfig, ElevenLabsProvider, SpeechFallbackChain, SpeechProvider,
};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Reply generation over the process-wide context
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub speech: Arc<SpeechFallbackChain>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        orchestrator: DialogueOrchestrator,
        speech: SpeechFallbackChain,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            orchestrator: Arc::new(orchestrator),
            speech: Arc::new(speech),
            metrics: None,
        }
    }

    /// Build the Gemini backend and the voice chain from settings
    ///
    /// The ElevenLabs provider is left out when voice is disabled, so every
    /// `/api/voice` call ends in a local-synthesis directive.
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let llm: Arc<dyn LlmBackend> =
            Arc::new(GeminiBackend::new(GeminiConfig::from(&settings.llm))?);
        let orchestrator = DialogueOrchestrator::new(llm, &settings.conversation);

        let mut providers: Vec<Arc<dyn SpeechProvider>> = Vec::new();
        if settings.voice.enabled {
            providers.push(Arc::new(ElevenLabsProvider::new(ElevenLabsConfig::from(
                &settings.voice,
            ))?));
        }
        let speech = SpeechFallbackChain::new(providers)
            .with_fallback_target(settings.voice.fallback_target.clone());

        tracing::info!(
            model = orchestrator.model_name(),
            voice_providers = speech.len(),
            "Application state initialized"
        );

        Ok(Self::new(settings, orchestrator, speech))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
