//! Dialogue orchestration
//!
//! Turns a user message into a persona reply using the language model and the
//! process-wide rolling context.

pub mod orchestrator;

pub use orchestrator::{DialogueOrchestrator, SharedContext};

use thiserror::Error;
use voice_avatar_llm::LlmError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<LlmError> for AgentError {
    fn from(err: LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}
