use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::provider::{
    AvailabilityFuture, CompletionFuture, CompletionOptions, LlmProvider, LlmProviderError,
    ProviderMessage,
};

const PROVIDER_NAME: &str = "ollama";
const AVAILABILITY_REQUEST_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub base_url: String,
    pub chat_timeout: Duration,
    pub probe_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum OllamaConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build Ollama http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct OllamaProvider {
    client: reqwest::Client,
    config: OllamaProviderConfig,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ProviderMessage],
    stream: bool,
    options: OllamaChatOptions,
}

#[derive(Debug, Serialize)]
struct OllamaChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaResponseMessage>,
    response: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: Option<Value>,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self, OllamaConfigError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(OllamaConfigError::InvalidConfiguration(
                "Ollama base URL must start with http:// or https://".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.chat_timeout)
            .build()
            .map_err(|err| OllamaConfigError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            config: OllamaProviderConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn send_chat(
        &self,
        messages: &[ProviderMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmProviderError> {
        let request_body = OllamaChatRequest {
            model: &options.model,
            messages,
            stream: false,
            options: OllamaChatOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LlmProviderError::Timeout {
                        timeout_ms: duration_ms(self.config.chat_timeout),
                    }
                } else {
                    LlmProviderError::ProviderFailure(format!("request_unavailable: {err}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|_| {
            LlmProviderError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;

        if !status.is_success() {
            return Err(LlmProviderError::ProviderFailure(format!(
                "status={} model={}",
                status.as_u16(),
                options.model
            )));
        }

        extract_completion_text(&body)
    }
}

impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn chat<'a>(
        &'a self,
        messages: &'a [ProviderMessage],
        options: &'a CompletionOptions,
    ) -> CompletionFuture<'a> {
        Box::pin(async move {
            // Dropping the in-flight request on expiry releases its connection.
            match timeout(self.config.chat_timeout, self.send_chat(messages, options)).await {
                Ok(result) => result,
                Err(_) => Err(LlmProviderError::Timeout {
                    timeout_ms: duration_ms(self.config.chat_timeout),
                }),
            }
        })
    }

    /// Callers own the availability deadline; the request timeout here only runs
    /// slightly past it so an abandoned check still releases its connection.
    fn is_available<'a>(&'a self) -> AvailabilityFuture<'a> {
        Box::pin(async move {
            let request_timeout = self.config.probe_timeout + AVAILABILITY_REQUEST_GRACE;
            let response = self
                .client
                .get(self.endpoint("/api/tags"))
                .timeout(request_timeout)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        warn!(
                            base_url = %self.config.base_url,
                            status = status.as_u16(),
                            "ollama availability check returned non-success status"
                        );
                    }
                    status.is_success()
                }
                Err(err) if err.is_timeout() => {
                    warn!(
                        base_url = %self.config.base_url,
                        timeout_ms = duration_ms(request_timeout),
                        "ollama availability check timed out"
                    );
                    false
                }
                Err(err) => {
                    warn!(
                        base_url = %self.config.base_url,
                        "ollama availability check failed: {err}"
                    );
                    false
                }
            }
        })
    }
}

/// Reads the completion text from either the chat shape (`message.content`) or
/// the generate shape (`response`).
pub(crate) fn extract_completion_text(body: &str) -> Result<String, LlmProviderError> {
    let parsed: OllamaChatResponse = serde_json::from_str(body).map_err(|_| {
        LlmProviderError::InvalidProviderPayload("response_json_parse_failed".to_string())
    })?;

    if let Some(Value::String(content)) = parsed.message.and_then(|message| message.content) {
        return Ok(content);
    }

    if let Some(Value::String(response)) = parsed.response {
        return Ok(response);
    }

    debug!("ollama response carried neither message.content nor response");
    Err(LlmProviderError::InvalidProviderPayload(
        "missing_content".to_string(),
    ))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
