use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::accounts::AccountError;
use shared::chat::ChatError;
use shared::history::HistoryError;
use shared::models::{ErrorBody, ErrorResponse};
use shared::repos::StoreError;
use tracing::{error, warn};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, code, message)
}

pub(super) fn unauthorized_response() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "Missing or invalid bearer token",
    )
}

pub(super) fn not_found_response(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", message)
}

pub(super) fn service_unavailable_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::SERVICE_UNAVAILABLE, code, message)
}

pub(super) fn store_error_response(err: StoreError) -> Response {
    error!("database operation failed: {err}");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Unexpected server error",
    )
}

pub(super) fn history_error_response(err: HistoryError) -> Response {
    match err {
        HistoryError::SessionNotFound => not_found_response("Chat not found"),
        HistoryError::Store(err) => store_error_response(err),
    }
}

pub(super) fn account_error_response(err: AccountError) -> Response {
    match err {
        AccountError::InvalidInput { code, message } => bad_request_response(code, message),
        AccountError::EmailTaken => {
            bad_request_response("email_taken", "A user with this email already exists")
        }
        AccountError::InvalidCredentials => error_response(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid email or password",
        ),
        AccountError::UserNotFound => not_found_response("User not found"),
        AccountError::Store(err) => store_error_response(err),
    }
}

pub(super) fn chat_error_response(err: ChatError) -> Response {
    warn!("chat processing failed: {err}");
    let code = match err {
        ChatError::ProviderUnavailable { .. } => "provider_unavailable",
        ChatError::CompletionFailed { .. } => "completion_failed",
        ChatError::ProviderSelection(_) => "provider_misconfigured",
    };
    service_unavailable_response(code, &err.to_string())
}
