/*!
 * Price list, model allow-list and pre-flight token/cost estimation.
 *
 * The price list maps `<category>_models` to per-model prices in USD per one
 * million tokens. The set of models accepted on the command line is exactly
 * the key set of the configured category.
 */

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ConfigError};
use crate::providers::openai::{OpenAIMessage, TokenUsage};

/// Price list shipped with the binary
pub const BUILTIN_PRICE_LIST: &str = include_str!("../../etc/openai_pricing.json");

/// Prices for one model, USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_tokens: f64,
    pub output_tokens: f64,
}

impl ModelPricing {
    pub fn input_cost(&self, tokens: usize) -> f64 {
        self.input_tokens * tokens as f64 / 1e6
    }

    pub fn output_cost(&self, tokens: usize) -> f64 {
        self.output_tokens * tokens as f64 / 1e6
    }
}

/// Model prices grouped by category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceList {
    categories: BTreeMap<String, BTreeMap<String, ModelPricing>>,
}

impl PriceList {
    /// Parse a price list from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidPriceList(e.to_string()))
    }

    /// The compiled-in price list
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_PRICE_LIST)
    }

    /// Load a price list from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path` when given, else fall back to the built-in list
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn section(&self, category: &str) -> Result<&BTreeMap<String, ModelPricing>, ConfigError> {
        let key = format!("{}_models", category);
        self.categories
            .get(&key)
            .ok_or(ConfigError::MissingPriceCategory(key))
    }

    /// Model identifiers available in a category, sorted
    pub fn models(&self, category: &str) -> Result<Vec<&str>, ConfigError> {
        Ok(self.section(category)?.keys().map(String::as_str).collect())
    }

    /// Pricing of a model; rejects anything outside the allow-list
    pub fn pricing(&self, category: &str, model: &str) -> Result<ModelPricing, ConfigError> {
        let section = self.section(category)?;
        section.get(model).copied().ok_or_else(|| ConfigError::UnknownModel {
            model: model.to_string(),
            available: section.keys().cloned().collect(),
        })
    }
}

/// Rough token count, ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Pre-flight estimate for a set of messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub input_tokens: usize,
    pub input_cost_usd: f64,
    pub max_input_tokens: usize,
}

impl CostEstimate {
    pub fn within_budget(&self) -> bool {
        self.input_tokens <= self.max_input_tokens
    }

    /// Refuse submission when the estimate is over the ceiling
    pub fn enforce(&self) -> Result<(), AppError> {
        if self.within_budget() {
            Ok(())
        } else {
            Err(AppError::BudgetExceeded {
                tokens: self.input_tokens,
                max: self.max_input_tokens,
            })
        }
    }
}

/// Estimate input tokens and cost for `messages`
pub fn estimate(messages: &[OpenAIMessage], pricing: &ModelPricing, max_input_tokens: usize) -> CostEstimate {
    let input_tokens = messages.iter().map(|m| estimate_tokens(&m.content)).sum();
    CostEstimate {
        input_tokens,
        input_cost_usd: pricing.input_cost(input_tokens),
        max_input_tokens,
    }
}

/// Cost of a completed request as reported by the provider
pub fn usage_cost(usage: &TokenUsage, pricing: &ModelPricing) -> f64 {
    pricing.input_cost(usage.prompt_tokens as usize) + pricing.output_cost(usage.completion_tokens as usize)
}
