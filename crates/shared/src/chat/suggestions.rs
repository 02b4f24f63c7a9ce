use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{CompletionOptions, LlmProvider, LlmProviderError, ProviderMessage};

const SUGGESTION_TEMPERATURE: f64 = 0.8;
const SUGGESTION_MAX_TOKENS: u32 = 150;
const MAX_SUGGESTIONS: usize = 3;
const MAX_SUGGESTION_CHARS: usize = 100;

const SUGGESTION_SYSTEM_PROMPT: &str = "Ты помощник, который предлагает релевантные вопросы \
на русском языке. Всегда отвечай ТОЛЬКО на русском языке.";

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("suggestion generation failed: {0}")]
    Generation(#[from] LlmProviderError),
}

/// Produces short follow-up questions for a chat turn. Best effort only.
#[derive(Debug, Clone)]
pub struct SuggestionGenerator {
    model: String,
}

impl SuggestionGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Never fails: any error is logged and yields an empty list.
    pub async fn generate(
        &self,
        category: &str,
        user_message: &str,
        provider: &dyn LlmProvider,
    ) -> Vec<String> {
        match self.try_generate(category, user_message, provider).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(category, "{err}");
                Vec::new()
            }
        }
    }

    async fn try_generate(
        &self,
        category: &str,
        user_message: &str,
        provider: &dyn LlmProvider,
    ) -> Result<Vec<String>, SuggestionError> {
        let messages = [
            ProviderMessage::system(SUGGESTION_SYSTEM_PROMPT),
            ProviderMessage::user(suggestion_prompt(category, user_message)),
        ];
        let options = CompletionOptions {
            model: self.model.clone(),
            temperature: SUGGESTION_TEMPERATURE,
            max_tokens: SUGGESTION_MAX_TOKENS,
        };

        let raw = provider.chat(&messages, &options).await?;
        let suggestions = parse_suggestions(&raw);
        debug!(category, count = suggestions.len(), "generated follow-up suggestions");
        Ok(suggestions)
    }
}

fn suggestion_prompt(category: &str, user_message: &str) -> String {
    format!(
        "На основе вопроса пользователя: \"{user_message}\"\n\
Предложи 3 коротких (до 5 слов) вопроса на РУССКОМ ЯЗЫКЕ, которые могут быть полезны \
владельцу малого бизнеса в категории \"{category}\".\n\
ВАЖНО: Все вопросы должны быть ТОЛЬКО на русском языке, без английских слов.\n\
Верни только вопросы, каждый с новой строки, без нумерации, без дефисов, без точек в начале."
    )
}

/// Turns raw model output into at most three clean, ordered questions.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches(is_enumeration_marker))
        .filter(|line| !line.is_empty() && line.chars().count() < MAX_SUGGESTION_CHARS)
        .take(MAX_SUGGESTIONS)
        .map(ToString::to_string)
        .collect()
}

fn is_enumeration_marker(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '•' | ' ')
}
