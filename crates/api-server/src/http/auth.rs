use axum::Json;
use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use chrono::{Duration, Utc};
use shared::accounts;
use shared::models::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserInfo,
};
use shared::repos::StoreError;
use tracing::{info, warn};

use super::errors::{account_error_response, store_error_response};
use super::tokens::{generate_access_token, hash_token};
use super::{AppState, AuthUser};

pub(super) async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let user = match accounts::register(&state.store, &req, Utc::now()).await {
        Ok(user) => user,
        Err(err) => return account_error_response(err),
    };

    info!(user_id = %user.id, "registered user");
    issue_session(&state, user).await
}

pub(super) async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let user = match accounts::authenticate(&state.store, &req.email, &req.password).await {
        Ok(user) => user,
        Err(err) => {
            warn!("login rejected: {err}");
            return account_error_response(err);
        }
    };

    issue_session(&state, user).await
}

pub(super) async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match state.store.find_user_by_id(user.user_id).await {
        Ok(Some(found)) => Json(UserInfo::from(found)).into_response(),
        Ok(None) => account_error_response(accounts::AccountError::UserNotFound),
        Err(err) => store_error_response(err),
    }
}

pub(super) async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    match accounts::update_profile(
        &state.store,
        user.user_id,
        req.name.as_deref(),
        req.phone.as_deref(),
    )
    .await
    {
        Ok(updated) => Json(UserInfo::from(updated)).into_response(),
        Err(err) => account_error_response(err),
    }
}

async fn issue_session(state: &AppState, user: User) -> Response {
    let now = Utc::now();
    let Some(expires_at) = i64::try_from(state.auth_token_ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
    else {
        return store_error_response(StoreError::InvalidData(format!(
            "auth token ttl {} is out of range",
            state.auth_token_ttl_seconds
        )));
    };
    let token = generate_access_token();

    if let Err(err) = state
        .store
        .create_auth_session(user.id, &hash_token(&token), now, expires_at)
        .await
    {
        return store_error_response(err);
    }

    match state.store.purge_expired_auth_sessions(user.id, now).await {
        Ok(0) => {}
        Ok(purged) => info!(user_id = %user.id, purged, "purged expired auth sessions"),
        Err(err) => warn!(user_id = %user.id, "failed to purge expired auth sessions: {err}"),
    }

    Json(AuthResponse {
        token,
        expires_in: state.auth_token_ttl_seconds,
        user: UserInfo::from(user),
    })
    .into_response()
}
