//! Test utilities: a scripted in-process stand-in for the Ollama server.

#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ragumami_core::RetryPolicy;
use ragumami_models::OllamaConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Step {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Step {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    script: Arc<Vec<Step>>,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

/// Mock backend. Replies follow the script in order; the last step repeats.
pub struct MockOllama {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockOllama {
    pub async fn start(script: Vec<Step>) -> Self {
        let state = MockState {
            script: Arc::new(script),
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let hits = Arc::clone(&state.hits);
        let requests = Arc::clone(&state.requests);

        let app = Router::new()
            .route("/api/generate", post(respond))
            .route("/api/embeddings", post(respond))
            .route("/api/tags", get(respond))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            requests,
        }
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// `(path, body)` of every request received so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("request log").clone()
    }
}

async fn respond(State(state): State<MockState>, uri: Uri, body: Bytes) -> Response {
    let index = state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .requests
        .lock()
        .expect("request log")
        .push((uri.path().to_string(), String::from_utf8_lossy(&body).into_owned()));

    let step = state
        .script
        .get(index)
        .or_else(|| state.script.last())
        .cloned()
        .unwrap_or_else(|| Step::ok(""));

    tokio::time::sleep(step.delay).await;
    let status = StatusCode::from_u16(step.status).expect("valid scripted status");
    (status, step.body).into_response()
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scratch listener");
    let addr = listener.local_addr().expect("scratch listener address");
    drop(listener);
    format!("http://{}", addr)
}

/// A loopback listener whose accept queue is full, so new connections stall
/// in the handshake until the client's connect timeout fires.
pub struct StalledListener {
    pub base_url: String,
    _listener: tokio::net::TcpListener,
    _queued: Vec<tokio::net::TcpStream>,
}

impl StalledListener {
    pub async fn start() -> Self {
        let socket = tokio::net::TcpSocket::new_v4().expect("socket");
        socket
            .bind("127.0.0.1:0".parse().expect("loopback address"))
            .expect("bind stalled listener");
        let listener = socket.listen(1).expect("listen");
        let addr = listener.local_addr().expect("stalled listener address");

        let mut queued = Vec::new();
        for _ in 0..4 {
            let connect = tokio::net::TcpStream::connect(addr);
            if let Ok(Ok(stream)) = tokio::time::timeout(Duration::from_millis(100), connect).await {
                queued.push(stream);
            }
        }

        Self {
            base_url: format!("http://{}", addr),
            _listener: listener,
            _queued: queued,
        }
    }
}

/// Config with millisecond backoff and a short request budget.
pub fn fast_config(base_url: &str) -> OllamaConfig {
    OllamaConfig::builder()
        .base_url(base_url)
        .model("llama3.2:3b")
        .connect_timeout_ms(500u64)
        .request_timeout_ms(1_000u64)
        .retry(
            RetryPolicy::builder()
                .initial_backoff_ms(10)
                .max_backoff_ms(1_000)
                .build()
                .expect("valid retry policy"),
        )
        .build()
        .expect("valid config")
}
