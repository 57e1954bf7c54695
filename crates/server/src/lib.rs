//! Voice avatar server
//!
//! HTTP endpoints for replies, speech and context reset, plus health, metrics
//! and the static client.

pub mod http;
pub mod metrics;
pub mod state;

pub use crate::http::create_router;
pub use crate::metrics::{
    init_metrics, record_llm_latency, record_request, record_tts_latency, record_voice_fallback,
};
pub use crate::state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use voice_avatar_core::ErrorBody;

/// Server errors
///
/// The message is the one shown to callers; internal details are logged where
/// the error is raised.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServerError {
    fn public_message(&self) -> &str {
        match self {
            ServerError::InvalidRequest(msg)
            | ServerError::Upstream(msg)
            | ServerError::Internal(msg)
            | ServerError::Configuration(msg) => msg,
        }
    }
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

impl From<voice_avatar_config::ConfigError> for ServerError {
    fn from(err: voice_avatar_config::ConfigError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}

impl From<voice_avatar_llm::LlmError> for ServerError {
    fn from(err: voice_avatar_llm::LlmError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}

impl From<voice_avatar_pipeline::PipelineError> for ServerError {
    fn from(err: voice_avatar_pipeline::PipelineError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}
