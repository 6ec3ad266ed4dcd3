/*!
 * Error types for the docx-translate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Fatal conditions
 * surface as one of these; a structural block-count mismatch is not an error and
 * is reported through `translation::protocol::Reconciliation` instead.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The HTTP client gave up waiting for the server
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::RequestFailed(_) | Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The request did not complete within the configured time
    #[error("Translation request timed out after {secs:.1}s")]
    Timeout {
        /// Configured limit in seconds
        secs: f64,
    },

    /// The model answered without any choice/content
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Every attempt failed with a retryable error
    #[error("Translation failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error of the final attempt
        last: Box<TranslationError>,
    },
}

/// Fatal pre-flight configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API credential could not be found
    #[error("API key '{key}' not found in any secret store ({searched})")]
    MissingSecret {
        /// Logical key name
        key: String,
        /// Human readable list of the stores that were consulted
        searched: String,
    },

    /// The requested model is not in the price list
    #[error("Unknown model '{model}'. Available models: {}", .available.join(", "))]
    UnknownModel {
        /// Requested model identifier
        model: String,
        /// Allow-list for the configured category
        available: Vec<String>,
    },

    /// The price list has no section for the configured model category
    #[error("Price list has no '{0}' section")]
    MissingPriceCategory(String),

    /// The price list could not be parsed
    #[error("Invalid price list: {0}")]
    InvalidPriceList(String),

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A configuration resource could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the resource
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading or writing a document container
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The source document could not be opened
    #[error("Failed to open document {path}: {source}")]
    Open {
        /// Path of the document
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The container is not a valid zip archive
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A required part is absent from the container
    #[error("Document part not found: {0}")]
    MissingPart(String),

    /// The WordprocessingML could not be parsed
    #[error("Malformed document XML: {0}")]
    Xml(String),

    /// The destination could not be created or serialized
    #[error("Failed to write {path}: {reason}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}

impl From<roxmltree::Error> for DocumentError {
    fn from(error: roxmltree::Error) -> Self {
        Self::Xml(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal configuration problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the document container
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Estimated input exceeds the configured token ceiling
    #[error("Input tokens ({tokens}) exceed the maximum of {max}")]
    BudgetExceeded {
        /// Estimated input tokens
        tokens: usize,
        /// Configured ceiling
        max: usize,
    },

    /// A run already contains the delimiter token
    #[error("Text run {run_index} contains the delimiter token '{token}'; configure a different delimiter")]
    DelimiterCollision {
        /// Position of the offending run
        run_index: usize,
        /// Delimiter token that collided
        token: String,
    },

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        Self::Translation(TranslationError::Provider(error))
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
