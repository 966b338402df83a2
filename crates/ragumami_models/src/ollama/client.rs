//! Ollama client with per-attempt timeouts and bounded retries.

use super::config::OllamaConfig;
use super::wire::TagsResponse;
use crate::GenerationMetrics;
use ragumami_core::{
    EmbeddingRequest, GenerationOutcome, GenerationRequest, GenerationResult, RetryState,
};
use ragumami_error::{
    GenerationError, GenerationErrorKind, RagumamiResult, RetryableError,
};
use ragumami_interface::{Embeddings, GenerationDriver};
use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, info, instrument, warn};

/// Client for a locally hosted Ollama server.
///
/// Build it once per process and share it; the underlying connection pool is
/// reused across calls and no other state is.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// HTTP client carrying the connect and request timeouts
    client: reqwest::Client,

    /// Endpoint, model and policies
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client from validated configuration.
    #[instrument(name = "ollama_client_new", skip(config), fields(model = %config.model(), url = %config.base_url()))]
    pub fn new(config: OllamaConfig) -> RagumamiResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::new(GenerationErrorKind::ClientBuild(e.to_string())))?;

        info!(
            connect_timeout_ms = config.connect_timeout_ms(),
            request_timeout_ms = config.request_timeout_ms(),
            max_retries = config.retry().max_retries(),
            "Creating Ollama client"
        );

        Ok(Self { client, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Generate text, applying the degradation policy to failures.
    ///
    /// Returns the backend's response body verbatim on success. Timeouts and
    /// unreachable backends come back as fallback text under the default
    /// policy; exhausted retries and 4xx responses are errors.
    pub async fn generate(&self, prompt: &str) -> RagumamiResult<String> {
        let outcome = self.generate_detailed(prompt).await?;
        Ok(self.config.degradation().resolve(outcome)?)
    }

    /// Generate text and report the tagged outcome without degrading it.
    ///
    /// Only an invalid request (blank prompt) is returned as an error.
    #[instrument(skip(self, prompt), fields(model = %self.config.model(), prompt_length = prompt.len()))]
    pub async fn generate_detailed(&self, prompt: &str) -> Result<GenerationOutcome, GenerationError> {
        let request = GenerationRequest::new(self.config.model(), prompt)?;
        let url = self.config.generate_url();
        let started = Instant::now();

        let (result, retry) = self.execute("generate", &url, &request).await;
        let elapsed = started.elapsed();
        let metrics = GenerationMetrics::get();

        let outcome = match result {
            Ok(body) => {
                info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    attempts = retry.attempts(),
                    "OLLAMA_SUCCESS: Generate completed"
                );
                metrics.record_success(self.config.model(), "generate", elapsed.as_secs_f64());
                return Ok(GenerationOutcome::Success(GenerationResult::new(body, elapsed)));
            }
            Err(e) => match e.kind {
                GenerationErrorKind::Timeout { .. } => {
                    error!(
                        model = %self.config.model(),
                        timeout_ms = self.config.request_timeout_ms(),
                        attempts = retry.attempts(),
                        "OLLAMA_TIMEOUT: Request timed out"
                    );
                    GenerationOutcome::Timeout {
                        attempts: *retry.attempts(),
                    }
                }
                GenerationErrorKind::ServerStatus { status_code } => {
                    error!(
                        status = status_code,
                        attempts = retry.attempts(),
                        backoff_ms = retry.elapsed_backoff().as_millis() as u64,
                        "OLLAMA_ERROR: Retries exhausted"
                    );
                    GenerationOutcome::TransientFailure {
                        status: status_code,
                        retry,
                    }
                }
                GenerationErrorKind::ClientStatus { status_code } => {
                    error!(status = status_code, "OLLAMA_ERROR: Request rejected");
                    GenerationOutcome::PermanentFailure {
                        status: status_code,
                    }
                }
                GenerationErrorKind::Transport(message) => {
                    error!(error = %message, "OLLAMA_ERROR: Failed to generate response");
                    GenerationOutcome::TransportFailure(message)
                }
                _ => return Err(e),
            },
        };

        metrics.record_failure(
            self.config.model(),
            "generate",
            outcome.label(),
            elapsed.as_secs_f64(),
        );
        Ok(outcome)
    }

    /// Request an embedding.
    ///
    /// The response is not decoded yet: success yields an empty vector. Every
    /// failure, timeouts included, is returned as an error.
    #[instrument(skip(self, text), fields(model = %self.config.model(), text_length = text.len()))]
    pub async fn embed(&self, text: &str) -> RagumamiResult<Vec<f32>> {
        let request = EmbeddingRequest::new(self.config.model(), text)?;
        let url = self.config.embeddings_url();
        let started = Instant::now();

        let (result, retry) = self.execute("embed", &url, &request).await;
        let elapsed = started.elapsed();
        let metrics = GenerationMetrics::get();

        match result {
            Ok(_body) => {
                info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "OLLAMA_EMBED_SUCCESS: Embedding completed"
                );
                metrics.record_success(self.config.model(), "embed", elapsed.as_secs_f64());
                Ok(Vec::new())
            }
            Err(e) if e.is_timeout() => {
                error!(
                    timeout_ms = self.config.request_timeout_ms(),
                    "OLLAMA_EMBED_TIMEOUT: Embedding timed out"
                );
                metrics.record_failure(
                    self.config.model(),
                    "embed",
                    "timeout",
                    elapsed.as_secs_f64(),
                );
                Err(e.into())
            }
            Err(e) => {
                let e = match e.kind {
                    GenerationErrorKind::ServerStatus { status_code } => {
                        GenerationError::new(GenerationErrorKind::RetryExhausted {
                            attempts: *retry.attempts(),
                            last_status: status_code,
                        })
                    }
                    _ => e,
                };
                error!(error = %e, "OLLAMA_EMBED_ERROR: Failed to create embedding");
                metrics.record_failure(
                    self.config.model(),
                    "embed",
                    "error",
                    elapsed.as_secs_f64(),
                );
                Err(e.into())
            }
        }
    }

    /// Check that the server is reachable and the configured model is installed.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> RagumamiResult<()> {
        debug!("Validating Ollama server and model availability");

        let response = self
            .client
            .get(self.config.tags_url())
            .send()
            .await
            .map_err(|e| classify_transport(e, "validate"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()).into());
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            GenerationError::new(GenerationErrorKind::Transport(format!(
                "Failed to decode model listing: {}",
                e
            )))
        })?;

        if !tags.models.iter().any(|m| m.name == *self.config.model()) {
            warn!(
                model = %self.config.model(),
                available = ?tags.models.iter().map(|m| &m.name).collect::<Vec<_>>(),
                "Model not found locally"
            );
            return Err(GenerationError::new(GenerationErrorKind::ModelNotFound(
                self.config.model().clone(),
            ))
            .into());
        }

        info!("Ollama server and model validated");
        Ok(())
    }

    /// Run one logical call: attempts strictly in sequence, 5xx retried with
    /// the configured backoff, everything else final.
    ///
    /// The retry state is local to this call.
    async fn execute<B>(
        &self,
        operation: &'static str,
        url: &str,
        body: &B,
    ) -> (Result<String, GenerationError>, RetryState)
    where
        B: Serialize + Sync,
    {
        let state = Mutex::new(RetryState::new());
        let delays: Vec<Duration> = self.config.retry().delays().collect();
        let total_attempts = self.config.retry().total_attempts();

        let this = self;
        let state_ref = &state;
        let delays_ref = &delays;

        let result = Retry::spawn(delays.clone(), move || async move {
            let attempt = update_state(state_ref, |s| {
                let attempt = s.begin_attempt();
                if attempt > 1 {
                    if let Some(delay) = delays_ref.get(attempt as usize - 2) {
                        s.record_backoff(*delay);
                    }
                }
                attempt
            });
            debug!(operation, attempt, "Sending attempt");

            match this.attempt(operation, url, body).await {
                Ok(text) => Ok(text),
                Err(e) => {
                    if let GenerationErrorKind::ServerStatus { status_code } = e.kind {
                        update_state(state_ref, |s| s.record_status(status_code));
                        if attempt < total_attempts {
                            warn!(
                                url,
                                status = status_code,
                                attempt,
                                "OLLAMA_RETRY: Retrying request due to server error"
                            );
                            GenerationMetrics::get().record_retry(
                                this.config.model(),
                                operation,
                                status_code,
                            );
                        }
                    }

                    if e.is_retryable() {
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await;

        let retry = state.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        (result, retry)
    }

    /// One POST under the client's timeouts, classified.
    async fn attempt<B>(
        &self,
        operation: &'static str,
        url: &str,
        body: &B,
    ) -> Result<String, GenerationError>
    where
        B: Serialize + Sync,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport(e, operation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport(e, operation))
    }
}

/// Apply `f` to the call's retry state. The lock is never held across an await.
fn update_state<T>(state: &Mutex<RetryState>, f: impl FnOnce(&mut RetryState) -> T) -> T {
    match state.lock() {
        Ok(mut guard) => f(&mut guard),
        Err(poisoned) => f(&mut poisoned.into_inner()),
    }
}

fn classify_status(status_code: u16) -> GenerationError {
    if (500..=599).contains(&status_code) {
        GenerationError::new(GenerationErrorKind::ServerStatus { status_code })
    } else {
        GenerationError::new(GenerationErrorKind::ClientStatus { status_code })
    }
}

fn classify_transport(err: reqwest::Error, operation: &str) -> GenerationError {
    if err.is_timeout() {
        GenerationError::new(GenerationErrorKind::Timeout {
            operation: operation.to_string(),
        })
    } else {
        GenerationError::new(GenerationErrorKind::Transport(err.to_string()))
    }
}

#[async_trait::async_trait]
impl GenerationDriver for OllamaClient {
    async fn generate(&self, prompt: &str) -> RagumamiResult<String> {
        OllamaClient::generate(self, prompt).await
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}

#[async_trait::async_trait]
impl Embeddings for OllamaClient {
    async fn embed(&self, text: &str) -> RagumamiResult<Vec<f32>> {
        OllamaClient::embed(self, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_split_at_500() {
        assert!(classify_status(500).is_retryable());
        assert!(classify_status(503).is_retryable());
        assert!(!classify_status(404).is_retryable());
        assert!(matches!(
            classify_status(422).kind,
            GenerationErrorKind::ClientStatus { status_code: 422 }
        ));
    }
}
