//! Speech recognition capability

use async_trait::async_trait;

/// How a single-shot recognition session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Final transcript of one utterance
    Utterance(String),
    /// The session timed out without hearing speech
    NoSpeech,
    /// The session ended without a result or an error
    Ended,
    /// Any other recognizer failure
    Error(String),
}

/// Platform speech recognizer
///
/// Each call to [`SpeechRecognizer::recognize`] is one single-result session with
/// interim results disabled.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Run one recognition session
    async fn recognize(&self, language: &str) -> RecognitionOutcome;

    /// Abort the current session, if any
    fn stop(&self);

    /// Whether recognition is available on this platform
    fn is_supported(&self) -> bool {
        true
    }
}
