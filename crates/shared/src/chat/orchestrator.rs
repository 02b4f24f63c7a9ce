use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

use super::suggestions::SuggestionGenerator;
use crate::llm::{
    CompletionOptions, LlmProvider, ProviderMessage, ProviderSelectionError, ProviderSelector,
    resolve_category, system_prompt_for,
};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{message}")]
    ProviderUnavailable { message: String },
    #[error("service temporarily unavailable: {message}")]
    CompletionFailed { message: String },
    #[error(transparent)]
    ProviderSelection(#[from] ProviderSelectionError),
}

/// One inbound chat turn. `context` is already rendered by the caller.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub message: String,
    pub category: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub category: String,
    pub suggestions: Vec<String>,
}

pub struct ChatOrchestrator {
    selector: Arc<ProviderSelector>,
    suggestions: SuggestionGenerator,
}

impl ChatOrchestrator {
    pub fn new(selector: Arc<ProviderSelector>) -> Self {
        let suggestions = SuggestionGenerator::new(selector.config().default_model.clone());
        Self {
            selector,
            suggestions,
        }
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    pub async fn process_chat(&self, turn: &ChatTurn) -> Result<ChatReply, ChatError> {
        let config = self.selector.config();
        let provider = self.selector.get_provider()?;

        ensure_available(provider.as_ref(), config.probe_timeout()).await?;

        let category = resolve_category(&turn.category);
        let messages = [
            ProviderMessage::system(system_prompt_for(category)),
            ProviderMessage::user(compose_user_message(&turn.message, turn.context.as_deref())),
        ];

        let primary = CompletionOptions {
            model: config.default_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let response = match provider.chat(&messages, &primary).await {
            Ok(text) => text,
            Err(primary_err) => {
                warn!(
                    model = %primary.model,
                    fallback_model = %config.fallback_model,
                    "primary model failed, retrying with fallback: {primary_err}"
                );
                let fallback = CompletionOptions {
                    model: config.fallback_model.clone(),
                    ..primary.clone()
                };
                provider
                    .chat(&messages, &fallback)
                    .await
                    .map_err(|fallback_err| ChatError::CompletionFailed {
                        message: fallback_err.to_string(),
                    })?
            }
        };

        let suggestions = self
            .suggestions
            .generate(category.id, &turn.message, provider.as_ref())
            .await;

        info!(
            category = category.id,
            suggestions = suggestions.len(),
            "chat completion succeeded"
        );

        Ok(ChatReply {
            response,
            category: category.id.to_string(),
            suggestions,
        })
    }
}

async fn ensure_available(provider: &dyn LlmProvider, deadline: Duration) -> Result<(), ChatError> {
    match timeout(deadline, provider.is_available()).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ChatError::ProviderUnavailable {
            message: format!(
                "provider {} is unavailable; check the settings and make sure the service is running at {}",
                provider.name(),
                provider.base_url()
            ),
        }),
        Err(_) => Err(ChatError::ProviderUnavailable {
            message: format!(
                "provider {} did not respond in time; check that it is running at {}",
                provider.name(),
                provider.base_url()
            ),
        }),
    }
}

/// Renders a context map as indented `key: value` JSON, or `None` when empty.
pub fn render_context(context: &Map<String, Value>) -> Option<String> {
    if context.is_empty() {
        return None;
    }
    serde_json::to_string_pretty(context).ok()
}

pub(crate) fn compose_user_message(message: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|context| !context.is_empty()) {
        Some(context) => format!("Контекст: {context}\n\nВопрос: {message}"),
        None => message.to_string(),
    }
}
