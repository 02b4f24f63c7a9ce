use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;

use crate::models::ChatRole;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, LlmProviderError>> + Send + 'a>>;

pub type AvailabilityFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ProviderMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Error)]
pub enum LlmProviderError {
    #[error("llm provider request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("llm provider request failed: {0}")]
    ProviderFailure(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

/// A language-model backend able to produce chat completions.
///
/// `is_available` reports reachability as a plain boolean; implementations log
/// and swallow network failures instead of returning them. The availability deadline
/// belongs to the caller, which tells a slow provider apart from a down one.
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn base_url(&self) -> &str;

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        options: &'a CompletionOptions,
    ) -> CompletionFuture<'a>;

    fn is_available<'a>(&'a self) -> AvailabilityFuture<'a>;
}
