//! Core types for the voice avatar
//!
//! This crate provides foundational types shared by the server and the client:
//! - Conversation turns and speaker roles
//! - The capped rolling context buffer
//! - HTTP wire types for the dialogue, voice and reset endpoints

pub mod api;
pub mod context;
pub mod conversation;

pub use api::{
    ChatRequest, ChatResponse, ErrorBody, FallbackDirective, ResetResponse, VoiceRequest,
    AUDIO_MPEG, LOCAL_FALLBACK_TARGET,
};
pub use context::{ContextBuffer, DEFAULT_MAX_TURNS};
pub use conversation::{Turn, TurnRole};
