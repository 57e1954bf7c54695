//! ElevenLabs text-to-speech provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;

use voice_avatar_config::VoiceSettings;
use voice_avatar_core::AUDIO_MPEG;

use super::{SpeechProvider, SynthesizedAudio};
use crate::PipelineError;

const API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base URL, without the `/v1` path
    pub endpoint: String,
    pub voice_id: String,
    pub api_key: Option<String>,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    /// Request timeout; unbounded when `None`
    pub timeout: Option<Duration>,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self::from(&VoiceSettings::default())
    }
}

impl From<&VoiceSettings> for ElevenLabsConfig {
    fn from(settings: &VoiceSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            voice_id: settings.voice_id.clone(),
            api_key: settings.api_key.clone(),
            model_id: settings.model_id.clone(),
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            style: settings.style,
            use_speaker_boost: settings.use_speaker_boost,
            timeout: settings.timeout(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceParameters,
}

#[derive(Serialize)]
struct VoiceParameters {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

/// ElevenLabs `text-to-speech/{voice_id}` provider
pub struct ElevenLabsProvider {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsProvider {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, PipelineError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            PipelineError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.endpoint, self.config.voice_id
        )
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, PipelineError> {
        let request = SpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceParameters {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
                style: self.config.style,
                use_speaker_boost: self.config.use_speaker_boost,
            },
        };

        let mut builder = self
            .client
            .post(self.api_url())
            .header(ACCEPT, AUDIO_MPEG)
            .json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), voice_id = %self.config.voice_id, "ElevenLabs synthesis complete");

        Ok(SynthesizedAudio::mpeg(bytes.to_vec()))
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
