//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status line texts shown while the conversation progresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTexts {
    #[serde(default = "default_connecting")]
    pub connecting: String,
    #[serde(default = "default_listening")]
    pub listening: String,
    #[serde(default = "default_thinking")]
    pub thinking: String,
    #[serde(default = "default_listening_again")]
    pub listening_again: String,
    #[serde(default = "default_no_speech")]
    pub no_speech: String,
    #[serde(default = "default_ended")]
    pub ended: String,
    #[serde(default = "default_devotional_preparing")]
    pub devotional_preparing: String,
    #[serde(default = "default_devotional_done")]
    pub devotional_done: String,
    #[serde(default = "default_unsupported")]
    pub unsupported: String,
}

fn default_connecting() -> String {
    "Jesus está se conectando...".to_string()
}
fn default_listening() -> String {
    "Jesus está te ouvindo...".to_string()
}
fn default_thinking() -> String {
    "Jesus está refletindo...".to_string()
}
fn default_listening_again() -> String {
    "Jesus está te ouvindo novamente...".to_string()
}
fn default_no_speech() -> String {
    "Não ouvi nada, fale novamente.".to_string()
}
fn default_ended() -> String {
    "Conversa encerrada.".to_string()
}
fn default_devotional_preparing() -> String {
    "Preparando devocional...".to_string()
}
fn default_devotional_done() -> String {
    "Devocional concluído.".to_string()
}
fn default_unsupported() -> String {
    "Seu navegador não suporta voz.".to_string()
}

impl Default for StatusTexts {
    fn default() -> Self {
        Self {
            connecting: default_connecting(),
            listening: default_listening(),
            thinking: default_thinking(),
            listening_again: default_listening_again(),
            no_speech: default_no_speech(),
            ended: default_ended(),
            devotional_preparing: default_devotional_preparing(),
            devotional_done: default_devotional_done(),
            unsupported: default_unsupported(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the avatar server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Language hint for recognition and local synthesis
    #[serde(default = "default_language")]
    pub language: String,

    /// Key under which the local context is persisted
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_greeting")]
    pub greeting: String,

    #[serde(default = "default_farewell")]
    pub farewell: String,

    #[serde(default = "default_devotional_prompt")]
    pub devotional_prompt: String,

    /// Reply shown when the server returns no text
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,

    /// Pause before listening again after a reply (ms)
    #[serde(default = "default_resume_delay_ms")]
    pub resume_delay_ms: u64,

    /// Pause before retrying after a no-speech result (ms)
    #[serde(default = "default_no_speech_delay_ms")]
    pub no_speech_delay_ms: u64,

    /// Pause before restarting after the recognizer ends on its own (ms)
    #[serde(default = "default_ended_restart_delay_ms")]
    pub ended_restart_delay_ms: u64,

    /// Interval between lipsync frames (ms)
    #[serde(default = "default_lipsync_interval_ms")]
    pub lipsync_interval_ms: u64,

    #[serde(default)]
    pub status: StatusTexts,
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_language() -> String {
    "pt-BR".to_string()
}
fn default_storage_key() -> String {
    "jesusContext".to_string()
}
fn default_max_turns() -> usize {
    voice_avatar_core::DEFAULT_MAX_TURNS
}
fn default_greeting() -> String {
    "Olá, filho ou filha. Como você está hoje?".to_string()
}
fn default_farewell() -> String {
    "A paz esteja contigo, filho ou filha. Até breve.".to_string()
}
fn default_devotional_prompt() -> String {
    "Traga uma palavra devocional curta e inspiradora.".to_string()
}
fn default_fallback_reply() -> String {
    "Filho, confie no Senhor.".to_string()
}
fn default_resume_delay_ms() -> u64 {
    1200
}
fn default_no_speech_delay_ms() -> u64 {
    1500
}
fn default_ended_restart_delay_ms() -> u64 {
    300
}
fn default_lipsync_interval_ms() -> u64 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            language: default_language(),
            storage_key: default_storage_key(),
            max_turns: default_max_turns(),
            greeting: default_greeting(),
            farewell: default_farewell(),
            devotional_prompt: default_devotional_prompt(),
            fallback_reply: default_fallback_reply(),
            resume_delay_ms: default_resume_delay_ms(),
            no_speech_delay_ms: default_no_speech_delay_ms(),
            ended_restart_delay_ms: default_ended_restart_delay_ms(),
            lipsync_interval_ms: default_lipsync_interval_ms(),
            status: StatusTexts::default(),
        }
    }
}

impl ClientConfig {
    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    pub fn no_speech_delay(&self) -> Duration {
        Duration::from_millis(self.no_speech_delay_ms)
    }

    /// Never zero, so a recognizer that keeps ending cannot spin the loop
    pub fn ended_restart_delay(&self) -> Duration {
        Duration::from_millis(self.ended_restart_delay_ms.max(1))
    }

    pub fn lipsync_interval(&self) -> Duration {
        Duration::from_millis(self.lipsync_interval_ms.max(1))
    }
}
