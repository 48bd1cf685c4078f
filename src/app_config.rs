use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Name of the local teacher profile to operate on
    #[serde(default = "default_profile_name")]
    pub profile_name: String,

    /// Generation config
    pub generation: GenerationConfig,

    /// Payment gateway and wallet config
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Pricing config
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Environment variable consulted for the generation API key
pub const API_KEY_ENV: &str = "LESSONFORGE_API_KEY";

/// Environment variable consulted for the payment gateway secret
pub const GATEWAY_KEY_ENV: &str = "LESSONFORGE_GATEWAY_KEY";

/// Generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

// Implement Display trait for GenerationProvider
impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for GenerationProvider
impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        match provider_type {
            GenerationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            GenerationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                rate_limit: Some(60),
            },
            GenerationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_anthropic_timeout_secs(),
                rate_limit: Some(45),
            },
        }
    }
}

/// Generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Generation provider to use
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available generation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common generation settings
    #[serde(default)]
    pub common: GenerationCommonConfig,
}

/// Common generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationCommonConfig {
    /// System prompt template for lesson note generation
    /// Placeholders: {subject}, {level}, {strand}, {sub_strand},
    /// {content_standard}, {template_name}, {lesson_count}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Rate limit delay in milliseconds between consecutive requests
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Base output token budget for a single-lesson request
    #[serde(default = "default_base_token_budget")]
    pub base_token_budget: u32,

    /// Additional output tokens granted per lesson beyond the first
    #[serde(default = "default_tokens_per_extra_lesson")]
    pub tokens_per_extra_lesson: u32,

    /// Hard ceiling on the output token budget
    #[serde(default = "default_max_token_budget")]
    pub max_token_budget: u32,
}

impl Default for GenerationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            base_token_budget: default_base_token_budget(),
            tokens_per_extra_lesson: default_tokens_per_extra_lesson(),
            max_token_budget: default_max_token_budget(),
        }
    }
}

/// Mobile-money payment gateway configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Gateway base URL
    #[serde(default = "default_gateway_endpoint")]
    pub endpoint: String,

    /// Gateway secret key; prefer the environment variable
    #[serde(default = "String::new")]
    pub secret_key: String,

    /// ISO currency code for charges
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gateway_endpoint(),
            secret_key: String::new(),
            currency: default_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PaymentConfig {
    /// Resolve the gateway secret, environment first, config second
    pub fn resolve_secret_key(&self) -> String {
        std::env::var(GATEWAY_KEY_ENV).unwrap_or_else(|_| self.secret_key.clone())
    }
}

/// Wallet pricing configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingConfig {
    /// Wallet cost of one generated lesson, in pesewas
    #[serde(default = "default_cost_per_lesson")]
    pub cost_per_lesson_pesewas: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            cost_per_lesson_pesewas: default_cost_per_lesson(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_profile_name() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_rate_limit_delay_ms() -> u64 {
    500 // 500ms default delay between requests
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_base_token_budget() -> u32 {
    3000
}

fn default_tokens_per_extra_lesson() -> u32 {
    1200
}

fn default_max_token_budget() -> u32 {
    8000
}

fn default_cost_per_lesson() -> i64 {
    150 // GHS 1.50 per lesson
}

fn default_currency() -> String {
    "GHS".to_string()
}

fn default_gateway_endpoint() -> String {
    "https://api.paystack.co".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku".to_string()
}

fn default_system_prompt() -> String {
    "You are an experienced Ghanaian basic-school teacher preparing lesson notes aligned to the national pre-tertiary curriculum. Write {lesson_count} lesson note(s) for {subject}, {level}, strand '{strand}', sub-strand '{sub_strand}', content standard {content_standard}, following the '{template_name}' template. Structure each note with phases (starter, new learning, reflection), numbered learner activities, and differentiation tiers.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate API key for hosted providers; Ollama is local and needs none
        match self.generation.provider {
            GenerationProvider::OpenAI | GenerationProvider::Anthropic => {
                let api_key = self.generation.get_api_key();
                if api_key.is_empty() {
                    return Err(anyhow!(
                        "Generation API key is required for {} provider (set {} or config)",
                        self.generation.provider.display_name(),
                        API_KEY_ENV
                    ));
                }
            }
            _ => {}
        }

        if self.pricing.cost_per_lesson_pesewas < 0 {
            return Err(anyhow!("Cost per lesson cannot be negative"));
        }

        url::Url::parse(&self.payment.endpoint)
            .map_err(|e| anyhow!("Invalid gateway endpoint '{}': {}", self.payment.endpoint, e))?;

        if self.generation.common.base_token_budget == 0 {
            return Err(anyhow!("Base token budget must be positive"));
        }

        if self.generation.common.max_token_budget < self.generation.common.base_token_budget {
            return Err(anyhow!(
                "Max token budget must be at least the base token budget"
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            profile_name: default_profile_name(),
            generation: GenerationConfig::default(),
            payment: PaymentConfig::default(),
            pricing: PricingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl GenerationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &GenerationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            GenerationProvider::Ollama => default_ollama_model(),
            GenerationProvider::OpenAI => default_openai_model(),
            GenerationProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider, environment first
    pub fn get_api_key(&self) -> String {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                return key;
            }
        }

        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Default fallback - Ollama doesn't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Hosted providers default to their public endpoints inside the clients
        match self.provider {
            GenerationProvider::Ollama => default_ollama_endpoint(),
            _ => String::new(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        match self.provider {
            GenerationProvider::Anthropic => default_anthropic_timeout_secs(),
            _ => default_timeout_secs(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: GenerationProvider::default(),
            available_providers: Vec::new(),
            common: GenerationCommonConfig::default(),
        };

        // Add default providers
        config
            .available_providers
            .push(ProviderConfig::new(GenerationProvider::Ollama));
        config
            .available_providers
            .push(ProviderConfig::new(GenerationProvider::OpenAI));
        config
            .available_providers
            .push(ProviderConfig::new(GenerationProvider::Anthropic));

        config
    }
}
