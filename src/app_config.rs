use log::{LevelFilter, debug};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::translation::protocol::Delimiter;

/// Application configuration module
/// This module handles loading and validating the configuration object that
/// is handed, read-only, to every stage of a run.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language, free text or ISO code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Output document config
    #[serde(default)]
    pub document: DocumentConfig,

    /// Secret lookup config
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model and request settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Model identifier, must be in the price list
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Price list category ("chat" reads "chat_models")
    #[serde(default = "default_model_category")]
    pub model_category: String,

    // @field: API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Price list replacing the built-in one
    #[serde(default)]
    pub price_list_path: Option<PathBuf>,

    // @field: Refuse requests estimated above this many input tokens
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: usize,

    // @field: Block separator in packed requests
    #[serde(default)]
    pub delimiter: Delimiter,

    /// Common request settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Request settings independent of the model
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationCommonConfig {
    /// Per-attempt request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature; the provider default applies when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Output document settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Directory for derived output paths
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Appended to the input's base name for derived output paths
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Group runs into their source paragraphs
    #[serde(default = "default_true")]
    pub preserve_paragraphs: bool,
}

/// Secret lookup settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SecretsConfig {
    /// Logical key name of the API credential
    #[serde(default = "default_api_key_name")]
    pub api_key_name: String,

    /// Secrets file replacing the per-user default
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "Lithuanian".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_model_category() -> String {
    "chat".to_string()
}

fn default_endpoint() -> String {
    crate::providers::openai::DEFAULT_ENDPOINT.to_string()
}

fn default_max_input_tokens() -> usize {
    5000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_output_suffix() -> String {
    "_translated".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_key_name() -> String {
    "openai_api_key".to_string()
}

impl Config {
    /// Load configuration from a JSON file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ConfigError::Invalid(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Invalid("target language must not be empty".to_string()));
        }

        if self.translation.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }

        match url::Url::parse(&self.translation.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid(format!(
                    "endpoint must use http or https, got '{}'",
                    url.scheme()
                )));
            }
            Err(e) => {
                return Err(ConfigError::Invalid(format!(
                    "invalid endpoint '{}': {}",
                    self.translation.endpoint, e
                )));
            }
        }

        if self.translation.common.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than zero".to_string()));
        }

        if self.translation.max_input_tokens == 0 {
            return Err(ConfigError::Invalid("max_input_tokens must be greater than zero".to_string()));
        }

        if let Some(temperature) = self.translation.common.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid(format!(
                    "temperature must be between 0 and 2, got {}",
                    temperature
                )));
            }
        }

        if self.secrets.api_key_name.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key_name must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            document: DocumentConfig::default(),
            secrets: SecretsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            model_category: default_model_category(),
            endpoint: default_endpoint(),
            price_list_path: None,
            max_input_tokens: default_max_input_tokens(),
            delimiter: Delimiter::default(),
            common: TranslationCommonConfig::default(),
        }
    }
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: None,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            output_suffix: default_output_suffix(),
            preserve_paragraphs: true,
        }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            api_key_name: default_api_key_name(),
            secrets_file: None,
        }
    }
}
