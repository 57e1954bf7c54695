//! LLM backend abstraction

use async_trait::async_trait;

use crate::LlmError;

/// LLM generation result
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Text of the first candidate, trimmed; `None` when the model returned none
    pub text: Option<String>,
    /// Total generation time (ms)
    pub total_time_ms: u64,
}

impl GenerationResult {
    pub fn new(text: Option<String>, total_time_ms: u64) -> Self {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            text,
            total_time_ms,
        }
    }
}

/// LLM Backend trait
///
/// The prompt is sent as the sole content of the request; conversation memory is
/// carried inside the prompt text.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}
