use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use shared::models::ProviderInfo;
use tokio::time::timeout;
use tracing::warn;

use super::AppState;

pub(super) async fn provider_info(State(state): State<AppState>) -> Response {
    let config = state.orchestrator.selector().config();
    Json(ProviderInfo {
        provider: config.provider.clone(),
        model: config.default_model.clone(),
        fallback_model: Some(config.fallback_model.clone()),
        available: None,
        error: None,
    })
    .into_response()
}

/// Always 200: probe failures are reported in the body.
pub(super) async fn provider_status(State(state): State<AppState>) -> Response {
    let selector = state.orchestrator.selector();
    let config = selector.config();

    let (available, error) = match selector.get_provider() {
        Ok(provider) => match timeout(config.probe_timeout(), provider.is_available()).await {
            Ok(true) => (true, None),
            Ok(false) => (
                false,
                Some(format!("provider is not reachable at {}", provider.base_url())),
            ),
            Err(_) => (
                false,
                Some(format!(
                    "provider did not answer within {} ms",
                    config.probe_timeout_ms
                )),
            ),
        },
        Err(err) => {
            warn!("provider status check failed: {err}");
            (false, Some(err.to_string()))
        }
    };

    Json(ProviderInfo {
        provider: config.provider.clone(),
        model: config.default_model.clone(),
        fallback_model: None,
        available: Some(available),
        error,
    })
    .into_response()
}
