//! Trait definitions for the Ragumami RAG API.
//!
//! The orchestrator talks to its collaborators only through these traits, so
//! tests can substitute in-memory implementations.

mod traits;

pub use traits::{Embeddings, GenerationDriver, WarehouseMetadata};
