//! External provider settings (language model and voice synthesis)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{endpoints, env, models, voice};

/// Language-model provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model name used in the `generateContent` path
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (defaults to `GEMINI_API_KEY`)
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    /// Optional request timeout; unbounded when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_llm_endpoint() -> String {
    endpoints::GEMINI_DEFAULT.to_string()
}
fn default_llm_model() -> String {
    models::GEMINI_MODEL.to_string()
}
fn default_llm_api_key() -> Option<String> {
    std::env::var(env::GEMINI_API_KEY).ok().filter(|k| !k.is_empty())
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key: default_llm_api_key(),
            timeout_seconds: None,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Voice-synthesis provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Enable the remote provider; when disabled every request gets the fallback directive
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API base URL
    #[serde(default = "default_voice_endpoint")]
    pub endpoint: String,

    /// Voice id (defaults to `ELEVENLABS_VOICE_ID`)
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// API key (defaults to `ELEVENLABS_API_KEY`)
    #[serde(default = "default_voice_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_voice_model")]
    pub model_id: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,

    #[serde(default = "default_style")]
    pub style: f32,

    #[serde(default = "default_true")]
    pub use_speaker_boost: bool,

    /// Target named in the fallback directive
    #[serde(default = "default_fallback_target")]
    pub fallback_target: String,

    /// Optional request timeout; unbounded when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_true() -> bool {
    true
}
fn default_voice_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}
fn default_voice_id() -> String {
    std::env::var(env::ELEVENLABS_VOICE_ID).unwrap_or_default()
}
fn default_voice_api_key() -> Option<String> {
    std::env::var(env::ELEVENLABS_API_KEY).ok().filter(|k| !k.is_empty())
}
fn default_voice_model() -> String {
    models::ELEVENLABS_MODEL.to_string()
}
fn default_stability() -> f32 {
    voice::STABILITY
}
fn default_similarity_boost() -> f32 {
    voice::SIMILARITY_BOOST
}
fn default_style() -> f32 {
    voice::STYLE
}
fn default_fallback_target() -> String {
    voice_avatar_core::LOCAL_FALLBACK_TARGET.to_string()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_voice_endpoint(),
            voice_id: default_voice_id(),
            api_key: default_voice_api_key(),
            model_id: default_voice_model(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
            style: default_style(),
            use_speaker_boost: voice::USE_SPEAKER_BOOST,
            fallback_target: default_fallback_target(),
            timeout_seconds: None,
        }
    }
}

impl VoiceSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
