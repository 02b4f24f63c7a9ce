pub mod ollama;
pub mod prompts;
pub mod provider;
pub mod selector;

pub use ollama::{OllamaConfigError, OllamaProvider, OllamaProviderConfig};
pub use prompts::{
    CategoryPrompt, LANGUAGE_DIRECTIVE, categories, resolve_category, system_prompt_for,
};
pub use provider::{
    AvailabilityFuture, CompletionFuture, CompletionOptions, LlmProvider, LlmProviderError,
    ProviderMessage,
};
pub use selector::{ProviderKind, ProviderSelectionError, ProviderSelector};
