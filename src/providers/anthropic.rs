use std::time::Duration;

use anyhow::Result;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Default public endpoint for the messages API
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value the messages API requires
const API_VERSION: &str = "2023-06-01";

/// Anthropic client used to draft lesson notes through the messages API
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Endpoint override for self-hosted gateways; empty means public API
    endpoint: String,
}

impl std::fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the API key
        f.debug_struct("Anthropic")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTurn {
    /// Role of the message sender (user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Request body for the messages API
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    model: String,
    messages: Vec<MessageTurn>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl MessagesRequest {
    /// Create a request for the given model and output token budget
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
            system: None,
            temperature: None,
        }
    }

    /// Append a user turn
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(MessageTurn {
            role: "user".to_string(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting returned with every completion
#[derive(Debug, Deserialize)]
pub struct MessagesUsage {
    /// Number of input tokens
    pub input_tokens: u64,
    /// Number of output tokens
    pub output_tokens: u64,
}

/// One content block of a completion
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    /// Block kind; only "text" blocks carry prose
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text payload for text blocks
    #[serde(default)]
    pub text: String,
}

/// Response body of the messages API
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    /// Ordered content blocks
    pub content: Vec<ContentBlock>,
    /// Token usage for the request
    pub usage: MessagesUsage,
}

impl MessagesResponse {
    /// Concatenate the text blocks of the completion
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect()
    }
}

impl Anthropic {
    /// Create a new client. An empty endpoint selects the public API.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn messages_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1/messages", base)
    }

    /// Send a messages request and parse the completion.
    pub async fn complete(&self, request: MessagesRequest) -> Result<MessagesResponse, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, message);
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(ProviderError::AuthenticationError(message));
            }
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimitExceeded(message));
            }
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    /// Probe the API with a one-token request.
    pub async fn test_connection(&self, model: &str) -> Result<(), ProviderError> {
        let request = MessagesRequest::new(model, 10).user("Hello");
        self.complete(request).await?;
        Ok(())
    }
}
