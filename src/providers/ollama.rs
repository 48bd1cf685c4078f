use std::time::Duration;

use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Ollama client for a locally hosted model server.
///
/// The chat endpoint streams line-delimited JSON when callers forget to
/// disable streaming; the parser below tolerates both shapes. Server and
/// network failures are retried with exponential backoff, client errors
/// are not.
pub struct Ollama {
    /// Base URL of the Ollama server
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Model sampling options
#[derive(Debug, Default, Serialize)]
pub struct OllamaOptions {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

impl OllamaChatRequest {
    /// Create a non-streaming chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: None,
            stream: false,
        }
    }

    /// Append a system message
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(OllamaMessage {
            role: "system".to_string(),
            content: content.into(),
        });
        self
    }

    /// Append a user message
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(OllamaMessage {
            role: "user".to_string(),
            content: content.into(),
        });
        self
    }

    /// Set sampling options
    pub fn options(mut self, options: OllamaOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    /// Response message
    pub message: OllamaMessage,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens, when reported
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens, when reported
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl Ollama {
    /// Create a new client for the given server
    pub fn new(base_url: impl Into<String>, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Chat with the Ollama server, retrying transient failures.
    pub async fn chat(&self, request: OllamaChatRequest) -> Result<OllamaChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));

        let mut attempt = 0;
        let mut last_error: Option<ProviderError> = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response
                            .text()
                            .await
                            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;
                        return parse_chat_response(&text);
                    } else if status.is_server_error() {
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            message,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        });
                    } else {
                        // Client error - don't retry
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Ollama API error ({}): {}", status, message);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;
            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// Probe the server version endpoint.
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "version probe failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a chat response that may be one JSON object or a JSONL stream.
fn parse_chat_response(text: &str) -> Result<OllamaChatResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<OllamaChatResponse>(text) {
        return Ok(response);
    }

    // Streaming fallback: concatenate the message content of each line and
    // take the token counts from the final (done) object.
    let mut content = String::new();
    let mut prompt_eval_count = None;
    let mut eval_count = None;
    let mut saw_done = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| ProviderError::ParseError(format!("invalid JSON line: {}", e)))?;

        if let Some(part) = value
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            content.push_str(part);
        }
        if value.get("done").and_then(|d| d.as_bool()).unwrap_or(false) {
            saw_done = true;
            prompt_eval_count = value.get("prompt_eval_count").and_then(|v| v.as_u64());
            eval_count = value.get("eval_count").and_then(|v| v.as_u64());
        }
    }

    if content.is_empty() && !saw_done {
        return Err(ProviderError::ParseError(
            "response was neither a chat object nor a JSONL stream".to_string(),
        ));
    }

    Ok(OllamaChatResponse {
        message: OllamaMessage {
            role: "assistant".to_string(),
            content,
        },
        done: true,
        prompt_eval_count,
        eval_count,
    })
}
