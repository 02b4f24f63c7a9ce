use std::sync::Arc;

use api_server::http::{AppState, build_router};
use shared::chat::ChatOrchestrator;
use shared::config::LlmConfig;
use shared::history::HistoryManager;
use shared::llm::ProviderSelector;
use shared::repos::Store;

const AUTH_TOKEN_TTL_SECONDS: u64 = 3600;

/// Router wired to a real store and an Ollama endpoint at `ollama_base_url`.
pub fn build_test_router(store: Store, ollama_base_url: &str) -> axum::Router {
    let llm_config = LlmConfig {
        ollama_base_url: ollama_base_url.to_string(),
        default_model: "primary-model".to_string(),
        fallback_model: "fallback-model".to_string(),
        chat_timeout_ms: 5_000,
        probe_timeout_ms: 1_000,
        ..LlmConfig::default()
    };
    let selector = Arc::new(ProviderSelector::new(llm_config));

    build_router(AppState {
        history: HistoryManager::new(Arc::new(store.clone())),
        store,
        orchestrator: Arc::new(ChatOrchestrator::new(selector)),
        auth_token_ttl_seconds: AUTH_TOKEN_TTL_SECONDS,
    })
}
