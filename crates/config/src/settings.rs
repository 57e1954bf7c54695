//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use voice_avatar_core::DEFAULT_MAX_TURNS;

use crate::constants::env;
use crate::{ConfigError, ConversationConfig, LlmSettings, VoiceSettings};

/// Environment variable naming the environment-specific config file
pub const ENV_SELECTOR: &str = "VOICE_AVATAR_ENV";

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// Provider keys must be configured
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Language-model provider
    #[serde(default)]
    pub llm: LlmSettings,

    /// Voice-synthesis provider
    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_providers()?;
        self.validate_conversation()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.environment.is_production()
            && self.server.cors_enabled
            && self.server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured, any origin is allowed"
            );
        }

        Ok(())
    }

    fn validate_providers(&self) -> Result<(), ConfigError> {
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.model".to_string()));
        }
        if self.voice.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("voice.endpoint".to_string()));
        }
        if self.voice.fallback_target.trim().is_empty() {
            return Err(ConfigError::MissingField("voice.fallback_target".to_string()));
        }

        for (field, value) in [
            ("voice.stability", self.voice.stability),
            ("voice.similarity_boost", self.voice.similarity_boost),
            ("voice.style", self.voice.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if self.llm.api_key.is_none() {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField("llm.api_key".to_string()));
            }
            tracing::warn!("No language model API key configured, replies will fail");
        }

        if self.voice.enabled && (self.voice.api_key.is_none() || self.voice.voice_id.is_empty()) {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField(
                    "voice.api_key / voice.voice_id".to_string(),
                ));
            }
            tracing::warn!("Voice provider not fully configured, clients will synthesize locally");
        }

        Ok(())
    }

    fn validate_conversation(&self) -> Result<(), ConfigError> {
        if self.conversation.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "conversation.max_turns".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        if self.conversation.max_turns > DEFAULT_MAX_TURNS {
            return Err(ConfigError::InvalidValue {
                field: "conversation.max_turns".to_string(),
                message: format!("Must be at most {}", DEFAULT_MAX_TURNS),
            });
        }
        if self.conversation.default_reply.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "conversation.default_reply".to_string(),
                message: "Default reply cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Defaults to `PORT`, then 3000
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Directory served for unmatched routes
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    std::env::var(env::PORT)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}
fn default_true() -> bool {
    true
}
fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Install the Prometheus recorder and expose `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` in the working directory
///
/// Priority: `VOICE_AVATAR__SECTION__KEY` env vars, then `config/{env}`, then
/// `config/default`, then built-in defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings from an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(
        File::with_name(&dir.join("default").to_string_lossy()).required(false),
    );

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_AVATAR")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        port = settings.server.port,
        model = %settings.llm.model,
        "Settings loaded"
    );

    Ok(settings)
}
