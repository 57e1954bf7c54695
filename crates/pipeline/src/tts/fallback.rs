//! Speech fallback chain
//!
//! Providers are tried in order and the first success wins. When every provider
//! fails the caller gets a [`FallbackDirective`] carrying the requested text.

use std::fmt;
use std::sync::Arc;

use voice_avatar_core::{FallbackDirective, LOCAL_FALLBACK_TARGET};

use super::{SpeechProvider, SynthesizedAudio};
use crate::PipelineError;

const QUOTA_MARKERS: [&str; 2] = ["quota_exceeded", "model_deprecated_free_tier"];

/// Failure bucket, used for logging and metrics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Out of credits, model unavailable on the plan, or rejected credentials
    QuotaOrAuth,
    Other,
}

impl FailureClass {
    pub fn classify(err: &PipelineError) -> Self {
        match err {
            PipelineError::Api { status, body } => {
                if *status == 401 || QUOTA_MARKERS.iter().any(|m| body.contains(m)) {
                    FailureClass::QuotaOrAuth
                } else {
                    FailureClass::Other
                }
            },
            _ => FailureClass::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::QuotaOrAuth => "quota_or_auth",
            FailureClass::Other => "other",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a synthesis attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutcome {
    Audio(SynthesizedAudio),
    /// No provider succeeded; `last_failure` is `None` when the chain is empty
    Fallback {
        directive: FallbackDirective,
        last_failure: Option<FailureClass>,
    },
}

/// Ordered list of speech providers
pub struct SpeechFallbackChain {
    providers: Vec<Arc<dyn SpeechProvider>>,
    fallback_target: String,
}

impl Default for SpeechFallbackChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SpeechFallbackChain {
    pub fn new(providers: Vec<Arc<dyn SpeechProvider>>) -> Self {
        Self {
            providers,
            fallback_target: LOCAL_FALLBACK_TARGET.to_string(),
        }
    }

    /// Name the target put in the directive
    pub fn with_fallback_target(mut self, target: impl Into<String>) -> Self {
        self.fallback_target = target.into();
        self
    }

    pub fn push(&mut self, provider: Arc<dyn SpeechProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Synthesize `text`, falling through providers in order
    ///
    /// Blank text is rejected with [`PipelineError::InvalidInput`]. Provider
    /// failures never surface as errors; they end in a directive instead.
    pub async fn synthesize(&self, text: &str) -> Result<SpeechOutcome, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::InvalidInput("text is empty".to_string()));
        }

        let mut last_failure = None;

        for provider in &self.providers {
            match provider.synthesize(text).await {
                Ok(audio) => {
                    tracing::debug!(provider = provider.name(), bytes = audio.len(), "Speech synthesized");
                    return Ok(SpeechOutcome::Audio(audio));
                },
                Err(e) => {
                    let class = FailureClass::classify(&e);
                    match class {
                        FailureClass::QuotaOrAuth => tracing::warn!(
                            provider = provider.name(),
                            class = %class,
                            "Speech provider out of credit or unauthorized: {}",
                            e
                        ),
                        FailureClass::Other => tracing::warn!(
                            provider = provider.name(),
                            class = %class,
                            "Speech provider failed: {}",
                            e
                        ),
                    }
                    last_failure = Some(class);
                },
            }
        }

        tracing::info!(target_voice = %self.fallback_target, "Directing client to local synthesis");

        Ok(SpeechOutcome::Fallback {
            directive: FallbackDirective::new(self.fallback_target.clone(), text),
            last_failure,
        })
    }
}
