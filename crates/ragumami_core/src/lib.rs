//! Core data types for the Ragumami RAG API.
//!
//! This crate provides the values that flow between the generation client,
//! the schema context provider and the orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generation;
mod prompt;
mod retry;
mod schema;

pub use generation::{EmbeddingRequest, GenerationOutcome, GenerationRequest, GenerationResult};
pub use prompt::{Prompt, PromptIntent};
pub use retry::{RetryPolicy, RetryPolicyBuilder, RetryPolicyBuilderError, RetryState};
pub use schema::{
    DEFAULT_FALLBACK_SCHEMA, SchemaContext, SchemaSourceKind, TableColumn, TableSchema, Website,
};
