//! Prompt assembly and request orchestration for the Ragumami RAG API.
//!
//! [`RagOrchestrator`] sequences one logical call: resolve the schema context
//! (SQL only), render the prompt, and hand it to the generation backend. It
//! never retries; retry and timeout policy belong to the backend client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;
mod prompt;

pub use orchestrator::RagOrchestrator;
pub use prompt::{build_chat_prompt, build_sql_prompt};
