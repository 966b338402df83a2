//! Request orchestration.

use crate::prompt::{build_chat_prompt, build_sql_prompt};
use ragumami_core::SchemaContext;
use ragumami_error::RagumamiResult;
use ragumami_interface::Embeddings;
use ragumami_schema::SchemaContextProvider;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sequences schema resolution, prompt rendering and generation.
///
/// Holds no per-call state; share one instance across requests.
#[derive(Clone)]
pub struct RagOrchestrator {
    backend: Arc<dyn Embeddings>,
    schema: SchemaContextProvider,
}

impl std::fmt::Debug for RagOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagOrchestrator")
            .field("provider", &self.backend.provider_name())
            .field("model", &self.backend.model_name())
            .field("schema", &self.schema)
            .finish()
    }
}

impl RagOrchestrator {
    /// Create an orchestrator over a shared backend client.
    pub fn new(backend: Arc<dyn Embeddings>, schema: SchemaContextProvider) -> Self {
        Self { backend, schema }
    }

    /// The schema context provider.
    pub fn schema(&self) -> &SchemaContextProvider {
        &self.schema
    }

    /// Answer a chat message.
    ///
    /// The backend's response is returned unmodified.
    #[instrument(skip(self, message), fields(model = %self.backend.model_name(), message_length = message.len()))]
    pub async fn chat(&self, message: &str) -> RagumamiResult<String> {
        let prompt = build_chat_prompt(message);
        self.backend.generate(prompt.text()).await
    }

    /// Generate SQL for a natural-language query.
    ///
    /// Schema resolution never fails; backend errors are returned as-is. The
    /// response is not checked for being valid SQL.
    #[instrument(skip(self, query), fields(model = %self.backend.model_name(), query_length = query.len()))]
    pub async fn generate_sql(&self, query: &str) -> RagumamiResult<String> {
        let schema = self.schema.context().await;
        debug!(source = %schema.source(), "Resolved schema context");

        let prompt = build_sql_prompt(query, &schema);
        self.backend.generate(prompt.text()).await
    }

    /// Resolve the schema context without generating anything.
    pub async fn schema_context(&self) -> SchemaContext {
        self.schema.context().await
    }

    /// Embed a text with the backend's embedding endpoint.
    #[instrument(skip(self, text), fields(model = %self.backend.model_name(), text_length = text.len()))]
    pub async fn embed_text(&self, text: &str) -> RagumamiResult<Vec<f32>> {
        self.backend.embed(text).await
    }
}
