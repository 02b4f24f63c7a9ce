use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config_env::{
    normalize_base_url, optional_trimmed_env, parse_f64_env, parse_list_env, parse_u32_env,
    parse_u64_env, require_env,
};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_AUTH_TOKEN_TTL_SECONDS: u64 = 7 * 24 * 3600;
const DEFAULT_CORS_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

const DEFAULT_LLM_PROVIDER: &str = "ollama";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama2";
const DEFAULT_OLLAMA_FALLBACK_MODEL: &str = "qwen";
const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4-turbo";
const DEFAULT_OPENROUTER_FALLBACK_MODEL: &str = "openai/gpt-3.5-turbo";
const DEFAULT_LOCALAI_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_LOCALAI_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_CHAT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub migrations_dir: PathBuf,
    pub auth_token_ttl_seconds: u64,
    pub cors_allowed_origins: Vec<String>,
}

/// Language-model settings. Read once at startup and never reloaded.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub openrouter_model: String,
    pub localai_base_url: String,
    pub localai_model: String,
    pub default_model: String,
    pub fallback_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub chat_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid number in env var {0}")]
    ParseFloat(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_u32_env("DATABASE_MAX_CONNECTIONS", 10)?,
            migrations_dir: optional_trimmed_env("MIGRATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../db/migrations")
                }),
            auth_token_ttl_seconds: parse_u64_env(
                "AUTH_TOKEN_TTL_SECONDS",
                DEFAULT_AUTH_TOKEN_TTL_SECONDS,
            )?,
            cors_allowed_origins: parse_list_env(
                "CORS_ALLOWED_ORIGINS",
                DEFAULT_CORS_ALLOWED_ORIGINS,
            ),
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            localai_base_url: DEFAULT_LOCALAI_BASE_URL.to_string(),
            localai_model: DEFAULT_LOCALAI_MODEL.to_string(),
            default_model: DEFAULT_OLLAMA_MODEL.to_string(),
            fallback_model: DEFAULT_OLLAMA_FALLBACK_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            chat_timeout_ms: DEFAULT_CHAT_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = optional_trimmed_env("LLM_PROVIDER")
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string());
        let ollama_base_url = optional_trimmed_env("OLLAMA_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string());
        let localai_base_url = optional_trimmed_env("LOCALAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_LOCALAI_BASE_URL.to_string());

        let mut config = Self {
            provider,
            ollama_base_url: normalize_base_url("OLLAMA_BASE_URL", &ollama_base_url)?,
            ollama_model: optional_trimmed_env("OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            openrouter_model: optional_trimmed_env("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            localai_base_url: normalize_base_url("LOCALAI_BASE_URL", &localai_base_url)?,
            localai_model: optional_trimmed_env("LOCALAI_MODEL")
                .unwrap_or_else(|| DEFAULT_LOCALAI_MODEL.to_string()),
            default_model: optional_trimmed_env("LLM_DEFAULT_MODEL").unwrap_or_default(),
            fallback_model: optional_trimmed_env("LLM_FALLBACK_MODEL").unwrap_or_default(),
            temperature: parse_f64_env("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: parse_u32_env("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            chat_timeout_ms: parse_u64_env("LLM_CHAT_TIMEOUT_MS", DEFAULT_CHAT_TIMEOUT_MS)?,
            probe_timeout_ms: parse_u64_env("LLM_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?,
        };
        config.fill_model_defaults();

        if config.chat_timeout_ms == 0 || config.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "LLM_CHAT_TIMEOUT_MS and LLM_PROBE_TIMEOUT_MS must be > 0".to_string(),
            ));
        }

        Ok(config)
    }

    /// Fills empty default/fallback model names from the provider's own model.
    pub fn fill_model_defaults(&mut self) {
        if self.default_model.is_empty() {
            self.default_model = match self.provider.as_str() {
                "openrouter" => self.openrouter_model.clone(),
                "localai" => self.localai_model.clone(),
                _ => self.ollama_model.clone(),
            };
        }

        if self.fallback_model.is_empty() {
            self.fallback_model = match self.provider.as_str() {
                "openrouter" => DEFAULT_OPENROUTER_FALLBACK_MODEL.to_string(),
                "localai" => self.localai_model.clone(),
                _ => DEFAULT_OLLAMA_FALLBACK_MODEL.to_string(),
            };
        }
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
