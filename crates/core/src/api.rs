//! HTTP wire types
//!
//! Request and response bodies shared by the server handlers and the client.

use serde::{Deserialize, Serialize};

/// MIME type of synthesized audio
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Target named in the fallback directive; the client synthesizes locally
pub const LOCAL_FALLBACK_TARGET: &str = "google";

/// `POST /api/gemini` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// `POST /api/gemini` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
}

/// `POST /api/voice` request
///
/// `text` is kept as a raw JSON value so that a non-string payload can be
/// rejected as invalid input rather than as a malformed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceRequest {
    #[serde(default)]
    pub text: Option<serde_json::Value>,
}

impl VoiceRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(serde_json::Value::String(text.into())),
        }
    }

    /// The text when present and a string
    pub fn text_str(&self) -> Option<&str> {
        self.text.as_ref().and_then(|v| v.as_str())
    }
}

/// Signal telling the caller to synthesize speech locally
///
/// Carries the requested text back so the caller does not need to resend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackDirective {
    pub fallback: String,
    pub text: String,
}

impl FallbackDirective {
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            fallback: target.into(),
            text: text.into(),
        }
    }

    /// Directive pointing at the client's built-in synthesis
    pub fn local(text: impl Into<String>) -> Self {
        Self::new(LOCAL_FALLBACK_TARGET, text)
    }
}

/// Error body used by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `POST /api/reset` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub ok: bool,
    pub message: String,
}
