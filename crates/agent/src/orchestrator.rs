//! Dialogue orchestrator
//!
//! The context is shared by every caller. Each buffer operation takes the lock
//! briefly and the lock is never held across the model call, so concurrent
//! replies may interleave their turns.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use voice_avatar_config::ConversationConfig;
use voice_avatar_core::{ContextBuffer, Turn, TurnRole};
use voice_avatar_llm::{LlmBackend, PromptBuilder};

use crate::AgentError;

/// Context buffer shared across requests
pub type SharedContext = Arc<Mutex<ContextBuffer>>;

/// Produces persona replies and keeps the rolling context
pub struct DialogueOrchestrator {
    llm: Arc<dyn LlmBackend>,
    context: SharedContext,
    prompt: PromptBuilder,
    default_reply: String,
}

impl DialogueOrchestrator {
    /// Create an orchestrator owning a fresh context sized by `config`
    pub fn new(llm: Arc<dyn LlmBackend>, config: &ConversationConfig) -> Self {
        let context = Arc::new(Mutex::new(ContextBuffer::with_capacity(config.max_turns)));
        Self::with_context(llm, context, config)
    }

    /// Create an orchestrator over an injected context
    pub fn with_context(
        llm: Arc<dyn LlmBackend>,
        context: SharedContext,
        config: &ConversationConfig,
    ) -> Self {
        Self {
            llm,
            context,
            prompt: PromptBuilder::from(config),
            default_reply: config.default_reply.clone(),
        }
    }

    /// Reply to `message`
    ///
    /// The user turn is recorded before the model is called and stays in the
    /// context if the call fails. The assistant turn is recorded only on success.
    pub async fn get_reply(&self, message: &str) -> Result<String, AgentError> {
        if message.trim().is_empty() {
            return Err(AgentError::InvalidInput("message is empty".to_string()));
        }

        let prompt = {
            let mut context = self.context.lock();
            context.append(TurnRole::User, message);
            self.prompt.build(context.turns(), message)
        };

        let start = Instant::now();
        let result = self.llm.generate(&prompt).await.map_err(|e| {
            tracing::error!(model = self.llm.model_name(), "Reply generation failed: {}", e);
            AgentError::from(e)
        })?;

        let reply = match result.text {
            Some(text) => text,
            None => {
                tracing::warn!(model = self.llm.model_name(), "Model returned no text, using default reply");
                self.default_reply.clone()
            },
        };

        let turns = {
            let mut context = self.context.lock();
            context.append(TurnRole::Assistant, reply.as_str());
            context.len()
        };

        tracing::info!(
            model = self.llm.model_name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            context_turns = turns,
            "Reply generated"
        );

        Ok(reply)
    }

    /// Clear the conversation context
    pub fn reset(&self) {
        self.context.lock().reset();
        tracing::info!("Conversation context cleared");
    }

    /// Ordered copy of the current context
    pub fn context_snapshot(&self) -> Vec<Turn> {
        self.context.lock().serialize()
    }

    pub fn context_len(&self) -> usize {
        self.context.lock().len()
    }

    pub fn shared_context(&self) -> SharedContext {
        Arc::clone(&self.context)
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}
