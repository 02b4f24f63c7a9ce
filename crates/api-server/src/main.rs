use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{self, AppState, cors_layer};
use shared::chat::ChatOrchestrator;
use shared::config::{ApiConfig, LlmConfig};
use shared::history::HistoryManager;
use shared::llm::ProviderSelector;
use shared::repos::Store;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "api_server=debug,shared=info,tower_http=info".to_string()
        }))
        .init();

    let config = match ApiConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let llm_config = match LlmConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to read llm config: {err}");
            std::process::exit(1);
        }
    };

    let store = match Store::connect(&config.database_url, config.database_max_connections).await
    {
        Ok(store) => store,
        Err(err) => {
            error!("failed to connect to postgres: {err}");
            std::process::exit(1);
        }
    };

    let migrator = match sqlx::migrate::Migrator::new(config.migrations_dir.clone()).await {
        Ok(migrator) => migrator,
        Err(err) => {
            error!("failed to load migrations: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = migrator.run(store.pool()).await {
        error!("failed to run migrations: {err}");
        std::process::exit(1);
    }

    info!(
        provider = %llm_config.provider,
        model = %llm_config.default_model,
        fallback_model = %llm_config.fallback_model,
        "language model configured"
    );
    let selector = Arc::new(ProviderSelector::new(llm_config));

    let app = http::build_router(AppState {
        history: HistoryManager::new(Arc::new(store.clone())),
        store,
        orchestrator: Arc::new(ChatOrchestrator::new(selector)),
        auth_token_ttl_seconds: config.auth_token_ttl_seconds,
    })
    .layer(cors_layer(&config.cors_allowed_origins))
    .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:8000".parse().expect("valid default bind addr"));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind should succeed");

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    axum::serve(listener, app).await.expect("server should run");
}
