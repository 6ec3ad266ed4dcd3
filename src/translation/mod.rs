/*!
 * Translation of packed documents using chat completion providers.
 *
 * - `protocol`: delimiter packing, splitting and reconciliation
 * - `prompts`: system instruction and message construction
 * - `pricing`: price list, model allow-list and cost estimation
 * - `core`: the translation service (timeout, retry, usage)
 */

// Re-export main types for easier usage
pub use self::core::{TranslationOptions, TranslationOutput, TranslationService};
pub use self::pricing::{CostEstimate, ModelPricing, PriceList};
pub use self::protocol::{Delimiter, Reconciliation};

// Submodules
pub mod core;
pub mod pricing;
pub mod prompts;
pub mod protocol;
