//! Prompt construction
//!
//! The model sees a single text: persona instructions, the recent transcript
//! labelled by speaker, and a cue for the next assistant line.

use voice_avatar_config::ConversationConfig;
use voice_avatar_core::{Turn, TurnRole};

/// Builds the persona prompt sent to the language model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    history_header: String,
    user_label: String,
    assistant_label: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from(&ConversationConfig::default())
    }
}

impl From<&ConversationConfig> for PromptBuilder {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            persona: config.persona.trim().to_string(),
            history_header: config.history_header.clone(),
            user_label: config.user_label.clone(),
            assistant_label: config.assistant_label.clone(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the persona instructions
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    fn label(&self, role: TurnRole) -> &str {
        match role {
            TurnRole::User => &self.user_label,
            TurnRole::Assistant => &self.assistant_label,
        }
    }

    /// One `"<Label>: <text>"` line per turn, oldest first
    pub fn transcript<'a>(&self, history: impl IntoIterator<Item = &'a Turn>) -> String {
        history
            .into_iter()
            .map(|turn| format!("{}: {}", self.label(turn.role()), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Full prompt for `message` given the history window
    pub fn build<'a>(&self, history: impl IntoIterator<Item = &'a Turn>, message: &str) -> String {
        format!(
            "{}\n\n{}\n{}\n\n{}: {}\n{}:",
            self.persona,
            self.history_header,
            self.transcript(history),
            self.user_label,
            message,
            self.assistant_label,
        )
    }
}
