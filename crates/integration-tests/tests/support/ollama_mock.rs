use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

/// Minimal Ollama stand-in serving `/api/chat` from a reply queue and `/api/tags`.
pub struct OllamaMock {
    pub base_url: String,
    pub seen_requests: Arc<Mutex<Vec<Value>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<tokio::task::JoinHandle<()>>,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    seen_requests: Arc<Mutex<Vec<Value>>>,
}

impl OllamaMock {
    /// Each text becomes one successful chat reply, served in order.
    pub async fn start(texts: &[&str]) -> Self {
        let replies = texts
            .iter()
            .map(|text| {
                (
                    StatusCode::OK,
                    json!({"message": {"role": "assistant", "content": text}, "done": true}),
                )
            })
            .collect::<VecDeque<_>>();
        let state = MockState {
            replies: Arc::new(Mutex::new(replies)),
            seen_requests: Arc::new(Mutex::new(Vec::new())),
        };
        let seen_requests = state.seen_requests.clone();

        let app = Router::new()
            .route("/api/chat", post(chat_handler))
            .route("/api/tags", get(tags_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("mock listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("mock server should run");
        });

        Self {
            base_url: format!("http://{local_addr}"),
            seen_requests,
            shutdown_tx: Some(shutdown_tx),
            server_task: Some(server_task),
        }
    }

    pub async fn stop(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(server_task) = self.server_task.take() {
            server_task.await.expect("mock server task should join");
        }
    }
}

async fn chat_handler(
    State(state): State<MockState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen_requests.lock().await.push(payload);
    let (status, body) = state.replies.lock().await.pop_front().unwrap_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "no mock reply queued"}),
    ));
    (status, Json(body))
}

async fn tags_handler() -> Json<Value> {
    Json(json!({"models": [{"name": "llama2"}]}))
}
