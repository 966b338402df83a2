//! Resilient text-generation client for the Ragumami RAG API.
//!
//! [`OllamaClient`] wraps a locally hosted Ollama server. Every attempt runs
//! under a connect timeout and an overall request timeout; 5xx responses are
//! retried with bounded exponential backoff; the tagged
//! [`GenerationOutcome`](ragumami_core::GenerationOutcome) is then resolved by
//! a [`DegradationPolicy`] into either text or an error.
//!
//! # Example
//!
//! ```no_run
//! use ragumami_models::{OllamaClient, OllamaConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OllamaConfig::builder()
//!     .base_url("http://localhost:11434")
//!     .model("llama3.2:3b")
//!     .build()?;
//! let client = OllamaClient::new(config)?;
//! let text = client.generate("Show all websites").await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

mod metrics;
mod ollama;

pub use metrics::GenerationMetrics;
pub use ollama::{
    DegradationPolicy, DegradationPolicyBuilder, OllamaClient, OllamaConfig, OllamaConfigBuilder,
    OllamaConfigBuilderError, DEFAULT_FAILURE_MESSAGE, DEFAULT_TIMEOUT_MESSAGE,
};
