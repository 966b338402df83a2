//! HTTP server for the Ragumami RAG API.
//!
//! Exposes the orchestrator over axum:
//!
//! - `GET /` liveness text
//! - `GET /health` static health document
//! - `POST /api/chat` `{message}` to `{response}`
//! - `POST /api/sql` `{query}` to `{sql}`
//!
//! Every failure, including an unreadable request body, is answered with
//! HTTP 500 and `{error}`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod dto;
mod observability;
mod server;

pub use api::{AppState, create_router};
pub use config::{
    AppConfig, AppConfigBuilder, AppConfigBuilderError, LoggingSettings, SchemaSettings,
    ServerSettings,
};
pub use dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, SqlRequest, SqlResponse};
pub use observability::{ObservabilityConfig, init_observability, shutdown_observability};
pub use server::{build_orchestrator, run, shutdown_signal};
