//! Test utilities: an in-process BigQuery REST stand-in and a scriptable
//! `WarehouseMetadata` mock.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ragumami_core::{TableColumn, TableSchema, Website};
use ragumami_error::{SchemaError, SchemaErrorKind};
use ragumami_interface::WarehouseMetadata;
use ragumami_schema::BigQueryConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PROJECT: &str = "team-analytics";
pub const DATASET: &str = "umami";
pub const STATIC_TOKEN: &str = "static-token";
pub const METADATA_TOKEN: &str = "metadata-token";

#[derive(Clone, Default)]
struct MockState {
    token_hits: Arc<AtomicUsize>,
    auth_headers: Arc<Mutex<Vec<String>>>,
    incomplete_left: Arc<AtomicUsize>,
    polls: Arc<AtomicUsize>,
    job_waits: Arc<Mutex<Vec<u64>>>,
}

impl MockState {
    /// Consume one pending `jobComplete: false` answer, if any remain.
    fn take_incomplete(&self) -> bool {
        self.incomplete_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// BigQuery REST stand-in serving a fixed dataset.
///
/// Websites come back in two result pages, tables in two list pages. Table
/// `broken` answers 500, unknown tables answer 404. Requests without a known
/// bearer token answer 401. A job can be made to report `jobComplete: false`
/// for a number of answers before its first page is ready.
pub struct MockBigQuery {
    pub base_url: String,
    state: MockState,
}

impl MockBigQuery {
    pub async fn start() -> Self {
        Self::start_with_slow_job(0).await
    }

    /// Start with the website query answering `jobComplete: false` for the
    /// first `incomplete` responses.
    pub async fn start_with_slow_job(incomplete: usize) -> Self {
        let state = MockState::default();
        state.incomplete_left.store(incomplete, Ordering::SeqCst);
        let app = Router::new()
            .route("/token", get(token))
            .route("/projects/:project/queries", post(query))
            .route("/projects/:project/queries/:job", get(query_results))
            .route("/projects/:project/datasets/:dataset", get(dataset))
            .route("/projects/:project/datasets/:dataset/tables", get(tables))
            .route(
                "/projects/:project/datasets/:dataset/tables/:table",
                get(table),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock warehouse");
        let addr = listener.local_addr().expect("mock warehouse address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock warehouse");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Config pointing at this server with the given static token.
    pub fn config(&self, access_token: Option<&str>) -> BigQueryConfig {
        BigQueryConfig::builder()
            .project_id(PROJECT)
            .dataset(DATASET)
            .api_base_url(self.base_url.clone())
            .metadata_token_url(format!("{}/token", self.base_url))
            .access_token(access_token.map(str::to_string))
            .request_timeout_ms(2_000u64)
            .build()
            .expect("valid config")
    }

    pub fn token_hits(&self) -> usize {
        self.state.token_hits.load(Ordering::SeqCst)
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.state.auth_headers.lock().expect("header log").clone()
    }

    /// `getQueryResults` calls without a page token.
    pub fn polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }

    /// `timeoutMs` values sent on query and result calls.
    pub fn job_waits(&self) -> Vec<u64> {
        self.state.job_waits.lock().expect("wait log").clone()
    }
}

fn record_wait(state: &MockState, wait: Option<u64>) {
    if let Some(wait) = wait {
        state.job_waits.lock().expect("wait log").push(wait);
    }
}

fn incomplete_job() -> Response {
    Json(json!({
        "jobComplete": false,
        "jobReference": {"projectId": PROJECT, "jobId": "job_1"}
    }))
    .into_response()
}

fn first_page() -> Response {
    Json(json!({
        "jobComplete": true,
        "jobReference": {"projectId": PROJECT, "jobId": "job_1"},
        "rows": [
            row("w-1", "Aksel", Some("aksel.nav.no")),
            row("w-2", "Arbeidsplassen", Some("arbeidsplassen.nav.no")),
        ],
        "pageToken": "page-2"
    }))
    .into_response()
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .auth_headers
        .lock()
        .expect("header log")
        .push(value.clone());

    let known = [
        format!("Bearer {}", STATIC_TOKEN),
        format!("Bearer {}", METADATA_TOKEN),
    ];
    if known.contains(&value) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Invalid credentials"}})),
        )
            .into_response())
    }
}

async fn token(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.token_hits.fetch_add(1, Ordering::SeqCst);
    if headers.get("metadata-flavor").and_then(|v| v.to_str().ok()) != Some("Google") {
        return StatusCode::FORBIDDEN.into_response();
    }
    Json(json!({"access_token": METADATA_TOKEN, "expires_in": 3599, "token_type": "Bearer"}))
        .into_response()
}

fn row(id: &str, name: &str, domain: Option<&str>) -> Value {
    json!({"f": [{"v": id}, {"v": name}, {"v": domain}]})
}

async fn query(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let sql = body["query"].as_str().unwrap_or_default();
    if body["useLegacySql"] != json!(false)
        || !sql.contains(&format!("`{}.{}.public_website`", PROJECT, DATASET))
    {
        return (StatusCode::BAD_REQUEST, "unexpected query").into_response();
    }
    record_wait(&state, body["timeoutMs"].as_u64());

    if state.take_incomplete() {
        incomplete_job()
    } else {
        first_page()
    }
}

async fn query_results(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_project, job)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    if job != "job_1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    record_wait(&state, params.get("timeoutMs").and_then(|v| v.parse().ok()));

    match params.get("pageToken").map(String::as_str) {
        None => {
            state.polls.fetch_add(1, Ordering::SeqCst);
            if state.take_incomplete() {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                incomplete_job()
            } else {
                first_page()
            }
        }
        Some("page-2") => last_page(),
        Some(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn last_page() -> Response {
    Json(json!({
        "jobComplete": true,
        "jobReference": {"projectId": PROJECT, "jobId": "job_1"},
        "rows": [row("w-3", "Intern", None)]
    }))
    .into_response()
}

async fn dataset(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_project, dataset)): Path<(String, String)>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    if dataset == DATASET {
        Json(json!({"id": format!("{}:{}", PROJECT, DATASET)})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn table_entry(name: &str) -> Value {
    json!({"tableReference": {"projectId": PROJECT, "datasetId": DATASET, "tableId": name}})
}

async fn tables(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    match params.get("pageToken").map(String::as_str) {
        None => Json(json!({
            "tables": [table_entry("website"), table_entry("event")],
            "nextPageToken": "tables-2"
        }))
        .into_response(),
        Some("tables-2") => Json(json!({"tables": [table_entry("broken")]})).into_response(),
        Some(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn table(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((_project, _dataset, table)): Path<(String, String, String)>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    match table.as_str() {
        "website" => Json(json!({"schema": {"fields": [
            {"name": "website_id", "type": "STRING", "mode": "REQUIRED"},
            {"name": "name", "type": "STRING", "mode": "REQUIRED", "description": "Display name"},
            {"name": "domain", "type": "STRING"}
        ]}}))
        .into_response(),
        "event" => Json(json!({"schema": {"fields": [
            {"name": "event_id", "type": "STRING", "mode": "REQUIRED"},
            {"name": "website_id", "type": "STRING", "mode": "REQUIRED"},
            {"name": "created_at", "type": "TIMESTAMP"}
        ]}}))
        .into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "backend error").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"message": format!("Not found: Table {}", table)}})),
        )
            .into_response(),
    }
}

/// Where a [`MockWarehouse`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Websites,
    Tables,
    Schema(&'static str),
}

/// In-memory `WarehouseMetadata` with an injectable failure.
pub struct MockWarehouse {
    pub fail_at: FailAt,
    pub calls: AtomicUsize,
}

impl MockWarehouse {
    pub fn new(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WarehouseMetadata for MockWarehouse {
    fn project_id(&self) -> &str {
        PROJECT
    }

    fn dataset(&self) -> &str {
        DATASET
    }

    async fn list_websites(&self) -> Result<Vec<Website>, SchemaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Websites {
            return Err(SchemaError::new(SchemaErrorKind::Auth(
                "credentials expired".to_string(),
            )));
        }
        Ok(vec![Website {
            id: "w-1".to_string(),
            name: "Aksel".to_string(),
            domain: Some("aksel.nav.no".to_string()),
        }])
    }

    async fn list_tables(&self) -> Result<Vec<String>, SchemaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Tables {
            return Err(SchemaError::new(SchemaErrorKind::Connection(
                "connection reset".to_string(),
            )));
        }
        Ok(vec!["event".to_string(), "session".to_string()])
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema, SchemaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_at, FailAt::Schema(name) if name == table_name) {
            return Err(SchemaError::new(SchemaErrorKind::TableNotFound(
                table_name.to_string(),
            )));
        }
        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns: vec![TableColumn {
                name: "website_id".to_string(),
                data_type: "STRING".to_string(),
                mode: "REQUIRED".to_string(),
                description: None,
            }],
        })
    }

    async fn is_healthy(&self) -> bool {
        self.fail_at == FailAt::Nothing
    }
}
