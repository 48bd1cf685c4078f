/*!
 * Lesson note generation using AI providers.
 *
 * This module contains the core functionality for producing lesson note
 * text from a curriculum request. It is split into two submodules:
 *
 * - `service`: Provider dispatch, token budgets and usage tracking
 * - `prompts`: Prompt templates and builders for lesson requests
 */

// Re-export main types for easier usage
pub use self::prompts::{LessonPromptBuilder, LessonRequest, PromptTemplate};
pub use self::service::{GenerationOutcome, GenerationService, TokenUsageStats};

// Submodules
pub mod prompts;
pub mod service;
