//! Request and result types for the text-generation backend.

use crate::RetryState;
use derive_getters::Getters;
use ragumami_error::{GenerationError, GenerationErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of one `POST /api/generate` call.
///
/// Serializes directly to the wire format `{model, prompt, stream}`. Streaming
/// is always disabled.
///
/// # Examples
///
/// ```
/// use ragumami_core::GenerationRequest;
///
/// let request = GenerationRequest::new("llama3.2:3b", "Show all websites").unwrap();
/// assert!(!request.stream());
///
/// let body = serde_json::to_value(&request).unwrap();
/// assert_eq!(body["model"], "llama3.2:3b");
/// assert_eq!(body["stream"], false);
///
/// assert!(GenerationRequest::new("llama3.2:3b", "   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GenerationRequest {
    model: String,
    prompt: String,
    stream: bool,
}

impl GenerationRequest {
    /// Create a non-streaming request, rejecting blank prompts.
    #[track_caller]
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::InvalidRequest(
                "prompt must not be empty".to_string(),
            )));
        }

        Ok(Self {
            model: model.into(),
            prompt,
            stream: false,
        })
    }
}

/// Body of one `POST /api/embeddings` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct EmbeddingRequest {
    model: String,
    prompt: String,
}

impl EmbeddingRequest {
    /// Create an embedding request, rejecting blank input.
    #[track_caller]
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Result<Self, GenerationError> {
        let prompt = text.into();
        if prompt.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::InvalidRequest(
                "embedding input must not be empty".to_string(),
            )));
        }

        Ok(Self {
            model: model.into(),
            prompt,
        })
    }
}

/// Successful generation: the raw response body and how long the logical
/// call took, retries included.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GenerationResult {
    text: String,
    elapsed: Duration,
}

impl GenerationResult {
    /// Wrap a response body.
    pub fn new(text: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            text: text.into(),
            elapsed,
        }
    }

    /// Take the response body.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Tagged result of one logical generation call.
///
/// The client produces this without judging it; the degradation policy
/// decides which variants become fallback text and which become errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The backend answered 2xx
    Success(GenerationResult),
    /// An attempt exceeded its connect or request timeout
    Timeout {
        /// Attempts made, the timed-out one included
        attempts: u32,
    },
    /// Every permitted attempt answered 5xx
    TransientFailure {
        /// Status of the final attempt
        status: u16,
        /// Bookkeeping for the whole logical call
        retry: RetryState,
    },
    /// The backend rejected the request with a non-retryable status
    PermanentFailure {
        /// HTTP status code
        status: u16,
    },
    /// No response at all (refused connection, DNS, broken body)
    TransportFailure(String),
}

impl GenerationOutcome {
    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Success(_) => "success",
            GenerationOutcome::Timeout { .. } => "timeout",
            GenerationOutcome::TransientFailure { .. } => "retry_exhausted",
            GenerationOutcome::PermanentFailure { .. } => "client_error",
            GenerationOutcome::TransportFailure(_) => "transport",
        }
    }
}
