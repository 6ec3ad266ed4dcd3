/*!
 * Tests for the price list and pre-flight estimation
 */

use std::fs;

use anyhow::Result;
use docx_translate::errors::{AppError, ConfigError};
use docx_translate::providers::openai::{OpenAIMessage, TokenUsage};
use docx_translate::translation::pricing::{self, estimate_tokens};
use docx_translate::translation::{ModelPricing, PriceList};

use crate::common;

#[test]
fn test_builtinPriceList_shouldListChatModels() -> Result<()> {
    let prices = PriceList::builtin()?;
    let models = prices.models("chat")?;

    assert!(models.contains(&"gpt-4o"));
    assert!(models.contains(&"gpt-4o-mini"));
    assert!(!models.contains(&"text-embedding-3-small"));

    let mini = prices.pricing("chat", "gpt-4o-mini")?;
    assert_eq!(mini.input_tokens, 0.15);
    assert_eq!(mini.output_tokens, 0.60);
    Ok(())
}

#[test]
fn test_pricing_withUnknownModel_shouldListAllowedModels() -> Result<()> {
    let prices = PriceList::builtin()?;

    match prices.pricing("chat", "text-embedding-3-small") {
        Err(ConfigError::UnknownModel { model, available }) => {
            assert_eq!(model, "text-embedding-3-small");
            assert!(available.iter().any(|m| m == "gpt-4o"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[test]
fn test_pricing_withUnknownCategory_shouldFail() -> Result<()> {
    let prices = PriceList::builtin()?;
    assert!(matches!(
        prices.models("vision"),
        Err(ConfigError::MissingPriceCategory(key)) if key == "vision_models"
    ));
    Ok(())
}

#[test]
fn test_loadOrBuiltin_withCustomFile_shouldReplaceBuiltin() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("prices.json");
    fs::write(
        &path,
        r#"{ "chat_models": { "local-llm": { "input_tokens": 0.0, "output_tokens": 0.0 } } }"#,
    )?;

    let prices = PriceList::load_or_builtin(Some(&path))?;

    assert_eq!(prices.models("chat")?, vec!["local-llm"]);
    assert!(PriceList::load_or_builtin(Some(&dir.path().join("missing.json"))).is_err());
    assert!(matches!(PriceList::from_json("[]"), Err(ConfigError::InvalidPriceList(_))));
    Ok(())
}

#[test]
fn test_estimateTokens_shouldRoundUpQuarterOfCharacters() {
    assert_eq!(estimate_tokens(""), 0);
    assert_eq!(estimate_tokens("abcd"), 1);
    assert_eq!(estimate_tokens("abcde"), 2);
    // Characters, not bytes
    assert_eq!(estimate_tokens("ąčęė"), 1);
}

#[test]
fn test_estimate_shouldSumMessagesAndPriceInput() {
    let messages = vec![
        OpenAIMessage::new("system", "a".repeat(4000)),
        OpenAIMessage::new("user", "b".repeat(4000)),
    ];
    let pricing = ModelPricing {
        input_tokens: 2.5,
        output_tokens: 10.0,
    };

    let estimate = pricing::estimate(&messages, &pricing, 5000);

    assert_eq!(estimate.input_tokens, 2000);
    assert!((estimate.input_cost_usd - 0.005).abs() < 1e-12);
    assert!(estimate.within_budget());
    assert!(estimate.enforce().is_ok());
}

#[test]
fn test_enforce_overBudget_shouldFail() {
    let messages = vec![OpenAIMessage::new("user", "x".repeat(400))];
    let pricing = ModelPricing {
        input_tokens: 1.0,
        output_tokens: 1.0,
    };

    let estimate = pricing::estimate(&messages, &pricing, 99);

    assert!(!estimate.within_budget());
    assert!(matches!(
        estimate.enforce(),
        Err(AppError::BudgetExceeded { tokens: 100, max: 99 })
    ));
}

#[test]
fn test_usageCost_shouldPriceBothDirections() {
    let usage = TokenUsage {
        prompt_tokens: 1_000_000,
        completion_tokens: 500_000,
        total_tokens: 1_500_000,
    };
    let pricing = ModelPricing {
        input_tokens: 0.15,
        output_tokens: 0.60,
    };

    assert!((pricing::usage_cost(&usage, &pricing) - 0.45).abs() < 1e-9);
}
