/*!
 * # lessonforge
 *
 * A Rust library for generating curriculum-aligned lesson notes for
 * Ghanaian teachers using AI chat-completion backends.
 *
 * ## Features
 *
 * - Generate lesson notes from curriculum taxonomy (strand, sub-strand,
 *   content standard) using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 * - Normalize free-form AI prose into structured logical lines
 * - Export notes as DOCX and print-ready HTML
 * - Per-profile wallet debited per generation, topped up via mobile money
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `render`: The lesson-content-to-document pipeline:
 *   - `render::normalize`: Splitting jumbled lists into logical lines
 *   - `render::markdown`: Inline bold/italic tokenization
 *   - `render::docx`: WordprocessingML document assembly
 *   - `render::html`: Print-ready HTML assembly
 * - `generation`: AI-powered note generation:
 *   - `generation::service`: Provider dispatch and token budgets
 *   - `generation::prompts`: Prompt templates and builders
 * - `payment`: Mobile-money gateway client and wallet
 * - `storage`: SQLite persistence for profiles, notes and transactions
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod generation;
pub mod payment;
pub mod providers;
pub mod render;
pub mod storage;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ExportOptions, GeneratedNote};
pub use errors::{AppError, PaymentError, ProviderError, RenderError, StorageError};
pub use generation::{GenerationService, LessonRequest};
pub use render::{DocxDocument, LessonPage, NoteMetadata, TextToken};
