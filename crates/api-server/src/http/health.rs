use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::llm::categories;
use shared::models::{CategoriesResponse, HealthResponse, OkResponse};
use tracing::warn;

use super::AppState;
use super::errors::service_unavailable_response;

pub(super) async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

pub(super) async fn readyz(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Err(err) => {
            warn!("readiness check failed: {err}");
            service_unavailable_response("db_unavailable", "Database not ready")
        }
    }
}

pub(super) async fn list_categories() -> impl IntoResponse {
    Json(CategoriesResponse {
        categories: categories(),
    })
}
