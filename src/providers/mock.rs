/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a plausible lesson note
 * - `MockProvider::intermittent(n)` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Succeeds with an empty completion
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The system prompt
    pub system: String,
    /// The user prompt
    pub prompt: String,
    /// Requested token budget
    pub max_tokens: u32,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The generated lesson text
    pub text: String,
    /// Simulated prompt tokens
    pub prompt_tokens: Option<u64>,
    /// Simulated completion tokens
    pub completion_tokens: Option<u64>,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a well-formed lesson note
    Working,
    /// Succeeds but returns prose with run-together lists and orphan markers
    Messy,
    /// Fails intermittently (every Nth request)
    Intermittent {
        /// Every Nth request fails
        fail_every: usize,
    },
    /// Always fails with an error
    Failing,
    /// Returns an empty completion
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow {
        /// Delay before responding
        delay_ms: u64,
    },
}

/// Mock provider for exercising generation behavior without a backend
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns messy, unnormalized prose
    pub fn messy() -> Self {
        Self::new(MockBehavior::Messy)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty completions
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// A small, well-formed lesson note body
    pub fn sample_note() -> String {
        concat!(
            "# Lesson Note\n",
            "**Indicator:** B4.1.1.1\n",
            "\n",
            "Activity 1: Warm-up discussion\n",
            "1. Ask learners about sources of water\n",
            "2. List responses on the board\n",
            "\n",
            "| Phase | Activity |\n",
            "|---|---|\n",
            "| Starter | Water sources chat |\n",
            "| Reflection | Exit ticket |\n",
        )
        .to_string()
    }

    /// Run-together prose exercising the normalizer heuristics
    pub fn messy_note() -> String {
        "Learning tasks: 1. Sing the water song 2. Draw a well a) label parts b) share Tier 1 support struggling learners**".to_string()
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Failing => {
                return Err(ProviderError::RequestFailed(
                    "mock provider configured to fail".to_string(),
                ));
            }
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    return Err(ProviderError::ConnectionError(
                        "mock intermittent failure".to_string(),
                    ));
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
            _ => {}
        }

        let text = if let Some(generator) = self.custom_response {
            generator(&request)
        } else {
            match self.behavior {
                MockBehavior::Empty => String::new(),
                MockBehavior::Messy => Self::messy_note(),
                _ => Self::sample_note(),
            }
        };

        Ok(MockResponse {
            prompt_tokens: Some((request.system.len() + request.prompt.len()) as u64 / 4),
            completion_tokens: Some(text.len() as u64 / 4),
            text,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock provider configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
