//! Language model integration
//!
//! Features:
//! - `LlmBackend` trait so the orchestrator can run against any model
//! - Gemini `generateContent` backend
//! - Persona prompt construction from the rolling context

pub mod backend;
pub mod gemini;
pub mod prompt;

pub use backend::{GenerationResult, LlmBackend};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::PromptBuilder;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}
