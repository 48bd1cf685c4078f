/*!
 * Core generation service implementation.
 *
 * Dispatches lesson note requests to the configured provider, computes
 * the output token budget from the requested lesson count, and tracks
 * token usage across a run.
 */

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, warn};

use crate::app_config::{GenerationConfig, GenerationProvider as ConfigProvider};
use crate::errors::ProviderError;
use crate::generation::prompts::{LessonPromptBuilder, LessonRequest, PromptTemplate};
use crate::providers::anthropic::{Anthropic, MessagesRequest};
use crate::providers::ollama::{Ollama, OllamaChatRequest, OllamaOptions};
use crate::providers::openai::{ChatCompletionRequest, ChatMessage, OpenAI};

/// Token usage statistics for tracking API consumption
#[derive(Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider: String::new(),
            model: String::new(),
        }
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            provider,
            model,
            ..Self::new()
        }
    }

    /// Add token usage numbers
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token usage: {} prompt + {} completion = {} total ({} / {}), API time {:.1}s",
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.provider,
            self.model,
            self.api_duration.as_secs_f64()
        )
    }
}

/// Result of one generation call
pub struct GenerationOutcome {
    /// The raw completion text
    pub text: String,
    /// Token usage for the call
    pub usage: TokenUsageStats,
}

/// Concrete provider client behind the service
enum ProviderClient {
    Ollama(Ollama),
    OpenAI(OpenAI),
    Anthropic(Anthropic),
}

/// Lesson note generation service
pub struct GenerationService {
    client: ProviderClient,
    config: GenerationConfig,
}

impl GenerationService {
    /// Build the service for the configured provider
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = match config.provider {
            ConfigProvider::Ollama => ProviderClient::Ollama(Ollama::new(
                config.get_endpoint(),
                config.common.retry_count,
                config.common.retry_backoff_ms,
            )),
            ConfigProvider::OpenAI => ProviderClient::OpenAI(OpenAI::new(
                config.get_api_key(),
                config.get_endpoint(),
                config.get_timeout_secs(),
            )),
            ConfigProvider::Anthropic => ProviderClient::Anthropic(Anthropic::new(
                config.get_api_key(),
                config.get_endpoint(),
                config.get_timeout_secs(),
            )),
        };

        Ok(Self { client, config })
    }

    /// Output token budget for a request: base plus a per-lesson increment,
    /// capped at the configured ceiling.
    pub fn token_budget(&self, lesson_count: u32) -> u32 {
        let common = &self.config.common;
        let extra = lesson_count
            .saturating_sub(1)
            .saturating_mul(common.tokens_per_extra_lesson);
        common
            .base_token_budget
            .saturating_add(extra)
            .min(common.max_token_budget)
    }

    /// Generate the lesson note text for one request.
    ///
    /// Hosted providers are retried here on transient failures; the
    /// Ollama client retries internally.
    pub async fn generate(&self, request: &LessonRequest) -> Result<GenerationOutcome, ProviderError> {
        let system = PromptTemplate::new(&self.config.common.system_prompt).render(request);
        let prompt = LessonPromptBuilder::new(request.clone()).build();
        let max_tokens = self.token_budget(request.effective_lesson_count());
        let model = self.config.get_model();

        debug!(
            "Generating {} lesson(s) with {} / {} (budget {} tokens)",
            request.effective_lesson_count(),
            self.config.provider,
            model,
            max_tokens
        );

        let mut usage =
            TokenUsageStats::with_provider_info(self.config.provider.to_lowercase_string(), model.clone());

        let started = Instant::now();
        let result = self
            .complete_with_retry(&model, &system, &prompt, max_tokens, &mut usage)
            .await;
        usage.api_duration = started.elapsed();

        let text = result?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(GenerationOutcome { text, usage })
    }

    /// Probe the configured provider.
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        let model = self.config.get_model();
        match &self.client {
            ProviderClient::Ollama(client) => client.test_connection().await,
            ProviderClient::OpenAI(client) => client.test_connection(&model).await,
            ProviderClient::Anthropic(client) => client.test_connection(&model).await,
        }
    }

    async fn complete_with_retry(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        usage: &mut TokenUsageStats,
    ) -> Result<String, ProviderError> {
        // The Ollama client retries internally; retrying here too would
        // square the attempt count
        let retries = match self.client {
            ProviderClient::Ollama(_) => 0,
            _ => self.config.common.retry_count,
        };
        let mut attempt = 0;
        let mut last_error: Option<ProviderError> = None;

        while attempt <= retries {
            match self.complete_once(model, system, prompt, max_tokens, usage).await {
                Ok(text) => return Ok(text),
                Err(e) if is_transient(&e) && attempt < retries => {
                    let backoff_ms = self.config.common.retry_backoff_ms * (1u64 << attempt);
                    warn!(
                        "Generation attempt {}/{} failed ({}); retrying in {}ms",
                        attempt + 1,
                        retries + 1,
                        e,
                        backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::RequestFailed("generation retries exhausted".to_string())))
    }

    async fn complete_once(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        max_tokens: u32,
        usage: &mut TokenUsageStats,
    ) -> Result<String, ProviderError> {
        let temperature = self.config.common.temperature;

        match &self.client {
            ProviderClient::Ollama(client) => {
                let request = OllamaChatRequest::new(model)
                    .system(system)
                    .user(prompt)
                    .options(OllamaOptions {
                        temperature: Some(temperature),
                        num_predict: Some(max_tokens),
                    });
                let response = client.chat(request).await?;
                usage.add_token_usage(response.prompt_eval_count, response.eval_count);
                Ok(response.message.content)
            }
            ProviderClient::OpenAI(client) => {
                let request = ChatCompletionRequest::new(model)
                    .message(ChatMessage::system(system))
                    .message(ChatMessage::user(prompt))
                    .max_tokens(max_tokens)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                if let Some(reported) = &response.usage {
                    usage.add_token_usage(
                        Some(reported.prompt_tokens),
                        Some(reported.completion_tokens),
                    );
                }
                Ok(response.text())
            }
            ProviderClient::Anthropic(client) => {
                let request = MessagesRequest::new(model, max_tokens)
                    .system(system)
                    .user(prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                usage.add_token_usage(
                    Some(response.usage.input_tokens),
                    Some(response.usage.output_tokens),
                );
                Ok(response.text())
            }
        }
    }
}

/// Whether an error is worth retrying.
fn is_transient(error: &ProviderError) -> bool {
    match error {
        ProviderError::ConnectionError(_) | ProviderError::RateLimitExceeded(_) => true,
        ProviderError::ApiError { status_code, .. } => *status_code >= 500,
        _ => false,
    }
}
