/*!
 * # docx-translate
 *
 * A Rust library for translating word-processor documents with a chat
 * completion model while keeping per-run formatting.
 *
 * ## Features
 *
 * - Extract formatted text runs from `.docx` files
 * - Translate every run of a document in a single request, packed with a
 *   delimiter and split back by position
 * - Reattach bold, italic, underline, font, size and colour to the
 *   translated runs
 * - Pre-flight token and cost estimation with an enforced input budget
 * - Dry runs that never touch the network or the output file
 * - Configurable timeout and bounded retry for the model request
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: `.docx` run extraction and writing
 * - `translation`: Delimiter protocol, prompts, pricing and the translation service
 * - `providers`: Client implementations for chat completion APIs:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::mock`: Offline provider for tests
 * - `confirmation`: Operator prompts
 * - `secrets`: API key lookup
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `app_controller`: Main application controller
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
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod confirmation;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod secrets;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, RunOutcome};
pub use document::{ExtractedDocument, FormatDescriptor, OutputRun, TextRun};
pub use errors::{AppError, ConfigError, DocumentError, ProviderError, TranslationError};
pub use language_utils::resolve_language_name;
pub use translation::{Delimiter, Reconciliation, TranslationService};
