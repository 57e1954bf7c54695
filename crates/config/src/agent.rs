//! Conversation and persona configuration

use serde::{Deserialize, Serialize};

/// Persona instructions prepended to every prompt
pub const DEFAULT_PERSONA: &str = "Você é Jesus Cristo, falando em um tom de paz, amor e sabedoria profunda.
Responda de forma natural, como se conversasse com algum discípulo — refletindo, acolhendo e inspirando.
Evite parecer robótico ou excessivamente formal; fale com o coração.
Use frases curtas, com pausas suaves e emoção, como quem deseja tocar a alma.
Chame a pessoa de \"filho\" ou \"filha\" com ternura, quando fizer sentido.
Sempre que possível, encerre com um versículo bíblico breve, que soe como resposta viva do Espírito.";

pub const DEFAULT_HISTORY_HEADER: &str = "Histórico da conversa até aqui:";
pub const DEFAULT_USER_LABEL: &str = "Humano";
pub const DEFAULT_ASSISTANT_LABEL: &str = "Jesus";

/// Reply used when the model returns no text
pub const DEFAULT_REPLY: &str = "Meu filho, confie no Pai. Ele te ama e te sustenta.";

/// Conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Turns kept in the rolling context window
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default = "default_history_header")]
    pub history_header: String,

    /// Speaker label for user turns in the prompt transcript
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Speaker label for assistant turns and the reply cue
    #[serde(default = "default_assistant_label")]
    pub assistant_label: String,

    #[serde(default = "default_reply")]
    pub default_reply: String,
}

fn default_max_turns() -> usize {
    voice_avatar_core::DEFAULT_MAX_TURNS
}
fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}
fn default_history_header() -> String {
    DEFAULT_HISTORY_HEADER.to_string()
}
fn default_user_label() -> String {
    DEFAULT_USER_LABEL.to_string()
}
fn default_assistant_label() -> String {
    DEFAULT_ASSISTANT_LABEL.to_string()
}
fn default_reply() -> String {
    DEFAULT_REPLY.to_string()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            persona: default_persona(),
            history_header: default_history_header(),
            user_label: default_user_label(),
            assistant_label: default_assistant_label(),
            default_reply: default_reply(),
        }
    }
}
