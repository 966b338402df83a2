//! Trait definitions for the generation backend and the warehouse.

use async_trait::async_trait;
use ragumami_core::{TableSchema, Website};
use ragumami_error::{RagumamiResult, SchemaError};

/// Core trait for text-generation backends.
///
/// `generate` returns the backend's response body verbatim. Implementations
/// own their timeout and retry policy; callers never retry.
#[async_trait]
pub trait GenerationDriver: Send + Sync {
    /// Generate text for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> RagumamiResult<String>;

    /// Provider name (e.g., "ollama").
    fn provider_name(&self) -> &'static str;

    /// Model identifier fixed at construction (e.g., "llama3.2:3b").
    fn model_name(&self) -> &str;
}

/// Trait for backends that can embed text.
#[async_trait]
pub trait Embeddings: GenerationDriver {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> RagumamiResult<Vec<f32>>;
}

/// Read-only metadata view of the analytics warehouse.
#[async_trait]
pub trait WarehouseMetadata: Send + Sync {
    /// Project the dataset lives in.
    fn project_id(&self) -> &str;

    /// Dataset holding the analytics tables.
    fn dataset(&self) -> &str;

    /// All tracked websites, ordered by name.
    async fn list_websites(&self) -> Result<Vec<Website>, SchemaError>;

    /// Table names in the dataset.
    async fn list_tables(&self) -> Result<Vec<String>, SchemaError>;

    /// Column listing for one table.
    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, SchemaError>;

    /// Whether the dataset is reachable.
    async fn is_healthy(&self) -> bool;
}
