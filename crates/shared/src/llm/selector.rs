use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{info, warn};

use super::ollama::{OllamaConfigError, OllamaProvider, OllamaProviderConfig};
use super::provider::LlmProvider;
use crate::config::LlmConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenRouter,
    LocalAi,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenRouter => "openrouter",
            Self::LocalAi => "localai",
            Self::OpenAi => "openai",
        }
    }

    /// Unknown names resolve to Ollama.
    pub fn from_config_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ollama" => Self::Ollama,
            "openrouter" => Self::OpenRouter,
            "localai" => Self::LocalAi,
            "openai" => Self::OpenAi,
            other => {
                warn!(provider = other, "unknown llm provider configured; using ollama");
                Self::Ollama
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderSelectionError {
    #[error("{0} provider is not implemented yet")]
    NotImplemented(&'static str),
    #[error(transparent)]
    Ollama(#[from] OllamaConfigError),
}

/// Resolves the configured provider once and hands out the same instance for
/// the rest of the process.
pub struct ProviderSelector {
    config: LlmConfig,
    instance: OnceLock<Arc<dyn LlmProvider>>,
}

impl ProviderSelector {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            instance: OnceLock::new(),
        }
    }

    /// Builds a selector whose slot is already filled with `provider`.
    pub fn with_provider(config: LlmConfig, provider: Arc<dyn LlmProvider>) -> Self {
        let instance = OnceLock::new();
        let _ = instance.set(provider);
        Self { config, instance }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn get_provider(&self) -> Result<Arc<dyn LlmProvider>, ProviderSelectionError> {
        if let Some(provider) = self.instance.get() {
            return Ok(Arc::clone(provider));
        }

        let provider = self.build_provider()?;
        // A concurrent caller may have won the race; both built equivalent clients.
        let _ = self.instance.set(Arc::clone(&provider));
        Ok(self.instance.get().cloned().unwrap_or(provider))
    }

    fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, ProviderSelectionError> {
        let kind = ProviderKind::from_config_name(&self.config.provider);
        match kind {
            ProviderKind::Ollama => {
                let provider = OllamaProvider::new(OllamaProviderConfig {
                    base_url: self.config.ollama_base_url.clone(),
                    chat_timeout: self.config.chat_timeout(),
                    probe_timeout: self.config.probe_timeout(),
                })?;
                info!(
                    base_url = %self.config.ollama_base_url,
                    model = %self.config.default_model,
                    "initialized ollama provider"
                );
                Ok(Arc::new(provider))
            }
            ProviderKind::OpenRouter | ProviderKind::LocalAi | ProviderKind::OpenAi => {
                Err(ProviderSelectionError::NotImplemented(kind.as_str()))
            }
        }
    }
}
