//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// `POST /api/chat` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
}

/// `POST /api/chat` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Backend response, unmodified
    pub response: String,
}

/// `POST /api/sql` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlRequest {
    /// Natural-language query
    pub query: String,
}

/// `POST /api/sql` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlResponse {
    /// Backend response, unmodified
    pub sql: String,
}

/// `GET /health` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy"
    pub status: String,
    /// Service name
    pub service: String,
    /// Deployment flavor
    pub flavor: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "rag-umami".to_string(),
            flavor: "umami".to_string(),
        }
    }
}

/// Body of every 500 answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Failure description
    pub error: String,
}
