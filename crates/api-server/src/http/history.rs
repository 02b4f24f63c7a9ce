use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use shared::models::{ChatHistoryResponse, CreateChatRequest, DEFAULT_CATEGORY};
use uuid::Uuid;

use super::errors::{bad_request_response, history_error_response, not_found_response};
use super::{AppState, AuthUser};

pub(super) async fn list_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.history.list_sessions(user.user_id).await {
        Ok(sessions) => Json(
            sessions
                .into_iter()
                .map(ChatHistoryResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(err) => history_error_response(err),
    }
}

pub(super) async fn get_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = Uuid::parse_str(&chat_id) else {
        return not_found_response("Chat not found");
    };

    match state.history.get_session(user.user_id, chat_id).await {
        Ok(session) => Json(ChatHistoryResponse::from(session)).into_response(),
        Err(err) => history_error_response(err),
    }
}

/// Body is optional; an absent or empty body starts a "general" chat.
pub(super) async fn create_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Response {
    let category = if body.iter().all(u8::is_ascii_whitespace) {
        DEFAULT_CATEGORY.to_string()
    } else {
        match serde_json::from_slice::<CreateChatRequest>(&body) {
            Ok(req) if !req.category.trim().is_empty() => req.category.trim().to_string(),
            Ok(_) => DEFAULT_CATEGORY.to_string(),
            Err(_) => {
                return bad_request_response("invalid_request", "Request body is not valid JSON");
            }
        }
    };

    let session_id = match state
        .history
        .create_session(user.user_id, &category, Utc::now())
        .await
    {
        Ok(session_id) => session_id,
        Err(err) => return history_error_response(err),
    };

    match state.history.get_session(user.user_id, session_id).await {
        Ok(session) => Json(ChatHistoryResponse::from(session)).into_response(),
        Err(err) => history_error_response(err),
    }
}

pub(super) async fn delete_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = Uuid::parse_str(&chat_id) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match state.history.delete_session(user.user_id, chat_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => history_error_response(err),
    }
}
