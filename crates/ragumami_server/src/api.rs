//! HTTP routes.

use crate::dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, SqlRequest, SqlResponse};
use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ragumami_error::{RagumamiError, ServerError, ServerErrorKind};
use ragumami_rag::RagOrchestrator;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, warn};

/// Text answered by `GET /`.
const ROOT_MESSAGE: &str = "🍜 Jamph-Rag-Api-Umami API is running!";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    orchestrator: Arc<RagOrchestrator>,
}

impl AppState {
    /// Creates new API state.
    pub fn new(orchestrator: RagOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// The orchestrator behind the API.
    pub fn orchestrator(&self) -> &RagOrchestrator {
        &self.orchestrator
    }
}

/// Creates the API router with CORS and request tracing.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Result<Router, ServerError> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                ServerError::new(ServerErrorKind::Configuration(format!(
                    "Invalid CORS origin '{}': {}",
                    origin, e
                )))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::OPTIONS,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri()
        )
    });

    Ok(Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/sql", post(sql))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state))
}

/// Any failure, answered as 500 `{error}`.
#[derive(Debug)]
struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: self.0 }),
        )
            .into_response()
    }
}

impl From<RagumamiError> for ApiError {
    fn from(err: RagumamiError) -> Self {
        error!(error = %err, "Request failed");
        Self(err.message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Unreadable request body");
        Self(rejection.body_text())
    }
}

async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// Never probes the backend or the warehouse.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.orchestrator().chat(&request.message).await?;
    Ok(Json(ChatResponse { response }))
}

async fn sql(
    State(state): State<AppState>,
    payload: Result<Json<SqlRequest>, JsonRejection>,
) -> Result<Json<SqlResponse>, ApiError> {
    let Json(request) = payload?;
    let sql = state.orchestrator().generate_sql(&request.query).await?;
    Ok(Json(SqlResponse { sql }))
}
