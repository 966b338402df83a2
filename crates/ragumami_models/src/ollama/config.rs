//! Connection, retry and degradation settings for the Ollama client.

use derive_getters::Getters;
use ragumami_core::{GenerationOutcome, RetryPolicy};
use ragumami_error::{ConfigError, GenerationError, GenerationErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text returned instead of an error when an attempt times out.
pub const DEFAULT_TIMEOUT_MESSAGE: &str =
    "Integrasjon til api rag virker, men ollama virker ikke (timeout)";

/// Text returned instead of an error when the backend cannot be reached.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Integrasjon til api rag virker, men ollama virker ikke";

/// Which generation outcomes degrade to human-readable text.
///
/// The defaults keep the established behaviour: timeouts and unreachable
/// backends become apologetic text, while a backend that keeps answering 5xx
/// fails the call. Client errors (4xx) always fail the call.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(default, setter(into))]
pub struct DegradationPolicy {
    /// Return `timeout_message` when an attempt times out
    #[serde(default = "default_true")]
    soften_timeouts: bool,

    /// Return `failure_message` when no response arrives at all
    #[serde(default = "default_true")]
    soften_transport_failures: bool,

    /// Return `failure_message` when retries are exhausted
    #[serde(default)]
    soften_retry_exhaustion: bool,

    /// Fallback text for timeouts
    #[serde(default = "default_timeout_message")]
    timeout_message: String,

    /// Fallback text for other failures
    #[serde(default = "default_failure_message")]
    failure_message: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout_message() -> String {
    DEFAULT_TIMEOUT_MESSAGE.to_string()
}

fn default_failure_message() -> String {
    DEFAULT_FAILURE_MESSAGE.to_string()
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self {
            soften_timeouts: true,
            soften_transport_failures: true,
            soften_retry_exhaustion: false,
            timeout_message: default_timeout_message(),
            failure_message: default_failure_message(),
        }
    }
}

impl DegradationPolicy {
    /// Creates a new degradation policy builder.
    pub fn builder() -> DegradationPolicyBuilder {
        DegradationPolicyBuilder::default()
    }

    /// Turn a generation outcome into text or an error.
    pub fn resolve(&self, outcome: GenerationOutcome) -> Result<String, GenerationError> {
        match outcome {
            GenerationOutcome::Success(result) => Ok(result.into_text()),
            GenerationOutcome::Timeout { .. } if self.soften_timeouts => {
                Ok(self.timeout_message.clone())
            }
            GenerationOutcome::Timeout { .. } => {
                Err(GenerationError::new(GenerationErrorKind::Timeout {
                    operation: "generate".to_string(),
                }))
            }
            GenerationOutcome::TransportFailure(_) if self.soften_transport_failures => {
                Ok(self.failure_message.clone())
            }
            GenerationOutcome::TransportFailure(message) => Err(GenerationError::new(
                GenerationErrorKind::Transport(message),
            )),
            GenerationOutcome::TransientFailure { .. } if self.soften_retry_exhaustion => {
                Ok(self.failure_message.clone())
            }
            GenerationOutcome::TransientFailure { status, retry } => Err(GenerationError::new(
                GenerationErrorKind::RetryExhausted {
                    attempts: *retry.attempts(),
                    last_status: status,
                },
            )),
            GenerationOutcome::PermanentFailure { status } => Err(GenerationError::new(
                GenerationErrorKind::ClientStatus {
                    status_code: status,
                },
            )),
        }
    }
}

/// Configuration for one Ollama backend.
///
/// # Examples
///
/// ```
/// use ragumami_models::OllamaConfig;
/// use std::time::Duration;
///
/// let config = OllamaConfig::builder()
///     .base_url("http://localhost:11434")
///     .model("llama3.2:3b")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.connect_timeout(), Duration::from_secs(10));
/// assert_eq!(config.request_timeout(), Duration::from_secs(30));
/// assert_eq!(config.generate_url(), "http://localhost:11434/api/generate");
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct OllamaConfig {
    /// Server URL (e.g. "http://localhost:11434")
    base_url: String,

    /// Model identifier sent with every request
    model: String,

    /// Budget for establishing the TCP connection, in milliseconds
    #[builder(default = "10_000")]
    #[serde(default = "default_connect_timeout_ms")]
    connect_timeout_ms: u64,

    /// Budget for one whole attempt, in milliseconds
    #[builder(default = "30_000")]
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// Backoff for 5xx responses
    #[builder(default)]
    #[serde(default)]
    retry: RetryPolicy,

    /// Which failures degrade to text
    #[builder(default)]
    #[serde(default)]
    degradation: DegradationPolicy,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl OllamaConfig {
    /// Creates a new config builder.
    pub fn builder() -> OllamaConfigBuilder {
        OllamaConfigBuilder::default()
    }

    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-attempt request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `POST` target for text generation.
    pub fn generate_url(&self) -> String {
        self.endpoint("/api/generate")
    }

    /// `POST` target for embeddings.
    pub fn embeddings_url(&self) -> String {
        self.endpoint("/api/embeddings")
    }

    /// `GET` target listing installed models.
    pub fn tags_url(&self) -> String {
        self.endpoint("/api/tags")
    }

    /// Check the settings before a client is built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::new("Ollama model must not be empty"));
        }
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::new(format!("Invalid Ollama base URL '{}': {}", self.base_url, e))
        })?;
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(ConfigError::new("Ollama timeouts must be greater than zero"));
        }
        self.retry.validate()
    }
}

impl From<OllamaConfigBuilderError> for ConfigError {
    #[track_caller]
    fn from(err: OllamaConfigBuilderError) -> Self {
        ConfigError::new(format!("Invalid Ollama configuration: {}", err))
    }
}
