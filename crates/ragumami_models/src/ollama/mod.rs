//! Ollama generation client.

mod client;
mod config;
mod wire;

pub use client::OllamaClient;
pub use config::{
    DEFAULT_FAILURE_MESSAGE, DEFAULT_TIMEOUT_MESSAGE, DegradationPolicy, DegradationPolicyBuilder,
    OllamaConfig, OllamaConfigBuilder, OllamaConfigBuilderError,
};
