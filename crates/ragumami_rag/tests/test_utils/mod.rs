//! Test utilities: recording generation backend and a broken warehouse.

#![allow(dead_code)]

use async_trait::async_trait;
use ragumami_core::{TableSchema, Website};
use ragumami_error::{
    GenerationError, GenerationErrorKind, RagumamiResult, SchemaError, SchemaErrorKind,
};
use ragumami_interface::{Embeddings, GenerationDriver, WarehouseMetadata};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&str) -> RagumamiResult<String> + Send + Sync>;

/// Backend that records every prompt and answers through a closure.
pub struct RecordingDriver {
    respond: Responder,
    prompts: Mutex<Vec<String>>,
}

impl RecordingDriver {
    pub fn new(respond: impl Fn(&str) -> RagumamiResult<String> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    pub fn answering(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    /// Always fail as if every retry got a 503.
    pub fn exhausted() -> Self {
        Self::new(|_| {
            Err(GenerationError::new(GenerationErrorKind::RetryExhausted {
                attempts: 4,
                last_status: 503,
            })
            .into())
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log").clone()
    }
}

#[async_trait]
impl GenerationDriver for RecordingDriver {
    async fn generate(&self, prompt: &str) -> RagumamiResult<String> {
        self.prompts
            .lock()
            .expect("prompt log")
            .push(prompt.to_string());
        (self.respond)(prompt)
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }

    fn model_name(&self) -> &str {
        "test-model"
    }
}

#[async_trait]
impl Embeddings for RecordingDriver {
    async fn embed(&self, _text: &str) -> RagumamiResult<Vec<f32>> {
        Ok(Vec::new())
    }
}

/// Warehouse whose every call fails.
pub struct BrokenWarehouse;

#[async_trait]
impl WarehouseMetadata for BrokenWarehouse {
    fn project_id(&self) -> &str {
        "team-analytics"
    }

    fn dataset(&self) -> &str {
        "umami"
    }

    async fn list_websites(&self) -> Result<Vec<Website>, SchemaError> {
        Err(SchemaError::new(SchemaErrorKind::Connection(
            "warehouse unreachable".to_string(),
        )))
    }

    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        Err(SchemaError::new(SchemaErrorKind::Connection(
            "warehouse unreachable".to_string(),
        )))
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, SchemaError> {
        Err(SchemaError::new(SchemaErrorKind::TableNotFound(
            table_name.to_string(),
        )))
    }

    async fn is_healthy(&self) -> bool {
        false
    }
}

/// Warehouse with one website and one table.
pub struct TinyWarehouse;

#[async_trait]
impl WarehouseMetadata for TinyWarehouse {
    fn project_id(&self) -> &str {
        "team-analytics"
    }

    fn dataset(&self) -> &str {
        "umami"
    }

    async fn list_websites(&self) -> Result<Vec<Website>, SchemaError> {
        Ok(vec![Website {
            id: "7a1b".to_string(),
            name: "Aksel".to_string(),
            domain: Some("aksel.nav.no".to_string()),
        }])
    }

    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        Ok(vec!["event".to_string()])
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, SchemaError> {
        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns: Vec::new(),
        })
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
