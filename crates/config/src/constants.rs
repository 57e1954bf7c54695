//! Centralized constants

/// External service endpoints
pub mod endpoints {
    /// Gemini generative language API base
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com";
    /// ElevenLabs API base
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";
}

/// Provider defaults
pub mod models {
    pub const GEMINI_MODEL: &str = "gemini-2.5-flash";
    pub const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";
}

/// Fixed voice parameters of the primary provider
pub mod voice {
    pub const STABILITY: f32 = 0.6;
    pub const SIMILARITY_BOOST: f32 = 0.85;
    pub const STYLE: f32 = 0.5;
    pub const USE_SPEAKER_BOOST: bool = true;
}

/// Provider environment variables, honored as defaults
pub mod env {
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
    pub const ELEVENLABS_VOICE_ID: &str = "ELEVENLABS_VOICE_ID";
    pub const PORT: &str = "PORT";
}
