use std::time::Instant;

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;
use shared::chat::{ChatTurn, render_context};
use shared::models::{ChatMessage, ChatRequest, ChatResponse, ChatRole, DEFAULT_CATEGORY};
use tracing::info;

use super::errors::{bad_request_response, chat_error_response, history_error_response};
use super::{AppState, AuthUser};

const MAX_MESSAGE_CHARS: usize = 2000;

pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let started = Instant::now();

    let message_chars = req.message.chars().count();
    if req.message.trim().is_empty() || message_chars > MAX_MESSAGE_CHARS {
        return bad_request_response(
            "invalid_message",
            "Message must be between 1 and 2000 characters",
        );
    }

    let category = match req.category.trim() {
        "" => DEFAULT_CATEGORY.to_string(),
        category => category.to_string(),
    };

    let session_id = match req.chat_id {
        Some(chat_id) => match state.history.get_session(user.user_id, chat_id).await {
            Ok(session) => session.id,
            Err(err) => return history_error_response(err),
        },
        None => match state
            .history
            .get_or_create_session(user.user_id, &category, Utc::now())
            .await
        {
            Ok(session_id) => session_id,
            Err(err) => return history_error_response(err),
        },
    };

    let mut context = req.context.unwrap_or_default();
    context.insert("userId".to_string(), Value::String(user.user_id.to_string()));

    let turn = ChatTurn {
        message: req.message.clone(),
        category,
        context: render_context(&context),
    };

    let reply = match state.orchestrator.process_chat(&turn).await {
        Ok(reply) => reply,
        Err(err) => return chat_error_response(err),
    };

    let asked_at = Utc::now();
    if let Err(err) = state
        .history
        .append_message(
            user.user_id,
            session_id,
            ChatMessage::new(ChatRole::User, req.message, asked_at),
            asked_at,
        )
        .await
    {
        return history_error_response(err);
    }

    let answered_at = Utc::now();
    let answer = ChatMessage::new(ChatRole::Assistant, reply.response.clone(), answered_at)
        .with_suggestions(reply.suggestions.clone());
    if let Err(err) = state
        .history
        .append_message(user.user_id, session_id, answer, answered_at)
        .await
    {
        return history_error_response(err);
    }

    info!(
        user_id = %user.user_id,
        %session_id,
        category = %reply.category,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "chat request completed"
    );

    Json(ChatResponse {
        response: reply.response,
        category: reply.category,
        suggestions: Some(reply.suggestions),
        chat_id: Some(session_id),
    })
    .into_response()
}
