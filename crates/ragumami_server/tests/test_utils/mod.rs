//! Test utilities: serve the router on an ephemeral port and stand in for
//! the generation backend.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Bytes, extract::State, http::StatusCode, routing::post};
use ragumami_error::{GenerationError, GenerationErrorKind, RagumamiResult};
use ragumami_interface::{Embeddings, GenerationDriver};
use ragumami_models::OllamaConfig;
use ragumami_core::RetryPolicy;
use ragumami_rag::RagOrchestrator;
use ragumami_schema::SchemaContextProvider;
use ragumami_server::{AppState, create_router};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

/// Serve `router` on 127.0.0.1 and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("test server address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{}", addr)
}

/// Serve the API over `orchestrator`.
pub async fn spawn_api(orchestrator: RagOrchestrator) -> String {
    let router = create_router(AppState::new(orchestrator), &default_origins())
        .expect("valid router");
    serve(router).await
}

/// Backend answering every prompt the same way.
pub struct StubBackend {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with an exhausted retry budget.
    pub fn failing() -> Self {
        Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log").clone()
    }
}

#[async_trait]
impl GenerationDriver for StubBackend {
    async fn generate(&self, prompt: &str) -> RagumamiResult<String> {
        self.prompts
            .lock()
            .expect("prompt log")
            .push(prompt.to_string());
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(GenerationError::new(GenerationErrorKind::RetryExhausted {
                attempts: 4,
                last_status: 503,
            })
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

#[async_trait]
impl Embeddings for StubBackend {
    async fn embed(&self, _text: &str) -> RagumamiResult<Vec<f32>> {
        Ok(Vec::new())
    }
}

pub fn orchestrator(backend: Arc<StubBackend>) -> RagOrchestrator {
    RagOrchestrator::new(backend, SchemaContextProvider::fallback())
}

#[derive(Clone)]
struct FakeOllamaState {
    status: u16,
    body: &'static str,
    delay: Duration,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Minimal `/api/generate` stand-in with a fixed reply.
pub struct FakeOllama {
    pub base_url: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeOllama {
    pub async fn start(status: u16, body: &'static str, delay: Duration) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = FakeOllamaState {
            status,
            body,
            delay,
            prompts: Arc::clone(&prompts),
        };
        let router = Router::new()
            .route("/api/generate", post(generate))
            .with_state(state);
        let base_url = serve(router).await;
        Self { base_url, prompts }
    }

    /// `prompt` field of every request received.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log").clone()
    }

    /// Client config with a short timeout and millisecond backoff.
    pub fn config(&self) -> OllamaConfig {
        OllamaConfig::builder()
            .base_url(self.base_url.clone())
            .model("llama3.2:3b")
            .request_timeout_ms(500u64)
            .retry(
                RetryPolicy::builder()
                    .initial_backoff_ms(5)
                    .build()
                    .expect("valid retry policy"),
            )
            .build()
            .expect("valid config")
    }
}

async fn generate(State(state): State<FakeOllamaState>, body: Bytes) -> (StatusCode, &'static str) {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&body) {
        let prompt = value["prompt"].as_str().unwrap_or_default().to_string();
        state.prompts.lock().expect("prompt log").push(prompt);
    }
    tokio::time::sleep(state.delay).await;
    (
        StatusCode::from_u16(state.status).expect("valid status"),
        state.body,
    )
}
