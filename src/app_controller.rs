use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::confirmation::ConfirmationProvider;
use crate::document::{self, DocxWriter, OutputRun, ParagraphLayout};
use crate::errors::{AppError, ConfigError};
use crate::file_utils::{FileManager, FileType};
use crate::language_utils;
use crate::providers::openai::{OpenAI, OpenAIMessage, OpenAIRequest, OpenAIResponse};
use crate::providers::{Connector, Provider};
use crate::secrets::{self, ChainedSecretStore, SecretStore};
use crate::translation::pricing::{self, CostEstimate, ModelPricing, PriceList};
use crate::translation::protocol::{self, Delimiter};
use crate::translation::{TranslationOptions, TranslationService, prompts};

// @module: Application controller for document translation

/// Per-invocation options, layered over the configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Source document
    pub input: PathBuf,
    /// Destination; derived from the input name when unset
    pub output: Option<PathBuf>,
    /// Model override
    pub model: Option<String>,
    /// Target language override
    pub language: Option<String>,
    /// Echo payloads, the raw response and the final pairs
    pub verbose: bool,
    /// Stop after estimation: no network call, no file write
    pub dry_run: bool,
}

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The output document was written
    Completed {
        output_path: PathBuf,
        runs_written: usize,
        /// Block count differed from the run count
        mismatch: bool,
        /// Cost of the request from reported usage
        usage_cost_usd: Option<f64>,
    },
    /// Dry run finished after estimation
    DryRun {
        output_path: PathBuf,
        runs: usize,
        estimate: CostEstimate,
    },
    /// The operator declined to overwrite an existing output
    Aborted { output_path: PathBuf },
}

/// Main application controller for document translation
pub struct Controller<P> {
    // @field: App configuration, read-only for the whole run
    config: Config,
    // @field: Model allow-list and prices
    price_list: PriceList,
    // @field: Builds the provider once the API key is known
    connector: Connector<P>,
    // @field: Where the API key is looked up
    secrets: Box<dyn SecretStore>,
    // @field: Operator prompts
    confirmation: Box<dyn ConfirmationProvider>,
    // @field: Show a spinner while waiting for the model
    show_progress: bool,
}

impl Controller<OpenAI> {
    // @method: Create a controller talking to the configured OpenAI endpoint
    pub fn with_config(config: Config, confirmation: Box<dyn ConfirmationProvider>) -> Result<Self, AppError> {
        let price_list = PriceList::load_or_builtin(config.translation.price_list_path.as_deref())?;
        let secrets = Box::new(ChainedSecretStore::from_config(&config.secrets));

        let endpoint = config.translation.endpoint.clone();
        let timeout = Duration::from_secs(config.translation.common.timeout_secs);
        let connector: Connector<OpenAI> =
            Box::new(move |api_key: &str| OpenAI::new_with_config(api_key, endpoint.clone(), timeout));

        Ok(Self::new(config, price_list, connector, secrets, confirmation))
    }
}

impl<P> Controller<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    pub fn new(
        config: Config,
        price_list: PriceList,
        connector: Connector<P>,
        secrets: Box<dyn SecretStore>,
        confirmation: Box<dyn ConfirmationProvider>,
    ) -> Self {
        Self {
            config,
            price_list,
            connector,
            secrets,
            confirmation,
            show_progress: false,
        }
    }

    /// Enable or disable the spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Models accepted for the configured category, with their prices
    pub fn available_models(&self) -> Result<Vec<(String, ModelPricing)>, ConfigError> {
        let category = &self.config.translation.model_category;
        self.price_list
            .models(category)?
            .into_iter()
            .map(|model| self.price_list.pricing(category, model).map(|p| (model.to_string(), p)))
            .collect()
    }

    /// Run the whole pipeline for one document
    pub async fn run(&self, options: RunOptions) -> Result<RunOutcome, AppError> {
        let start_time = Instant::now();
        let translation = &self.config.translation;
        let delimiter = &translation.delimiter;

        // Pre-flight checks, before any network or file activity
        self.config.validate()?;
        let model = options.model.as_deref().unwrap_or(&translation.model);
        let pricing = self.price_list.pricing(&translation.model_category, model)?;

        let language = language_utils::resolve_language_name(
            options.language.as_deref().unwrap_or(&self.config.target_language),
        );
        if language.is_empty() {
            return Err(ConfigError::Invalid("target language must not be empty".to_string()).into());
        }

        let api_key = if options.dry_run {
            None
        } else {
            Some(secrets::resolve_secret(self.secrets.as_ref(), &self.config.secrets.api_key_name)?)
        };

        let output_path = self.output_path(&options);
        if !options.dry_run && output_path.exists() {
            let prompt = format!("Output file {} already exists. Overwrite?", output_path.display());
            if !self.confirmation.confirm(&prompt) {
                info!("Not overwriting {:?}, nothing to do", output_path);
                return Ok(RunOutcome::Aborted { output_path });
            }
        }

        // Extraction
        self.check_input(&options.input)?;
        let extracted = document::read_docx(&options.input)?;
        info!(
            "Extracted {} runs in {} paragraphs from {:?}",
            extracted.len(),
            extracted.paragraph_count(),
            options.input
        );
        let texts = extracted.texts();
        let slots = extracted.slots();

        if let Some(&run_index) = protocol::find_collisions(&texts, delimiter).first() {
            return Err(AppError::DelimiterCollision {
                run_index,
                token: delimiter.token().to_string(),
            });
        }

        let writer = DocxWriter::new(ParagraphLayout::from_preserve_flag(
            self.config.document.preserve_paragraphs,
        ));

        if extracted.is_empty() {
            warn!("Document contains no text runs");
            if options.dry_run {
                return Ok(RunOutcome::DryRun {
                    output_path,
                    runs: 0,
                    estimate: CostEstimate {
                        input_tokens: 0,
                        input_cost_usd: 0.0,
                        max_input_tokens: translation.max_input_tokens,
                    },
                });
            }
            writer.write(&output_path, &[])?;
            info!("Wrote empty document to {:?}", output_path);
            return Ok(RunOutcome::Completed {
                output_path,
                runs_written: 0,
                mismatch: false,
                usage_cost_usd: None,
            });
        }

        // Packing and estimation
        let packed = protocol::pack(&texts, delimiter);
        if let Some(run_index) = protocol::find_join_collision(&texts, &packed, delimiter) {
            return Err(AppError::DelimiterCollision {
                run_index,
                token: delimiter.token().to_string(),
            });
        }
        let messages = prompts::build_messages(&packed, &language, delimiter);
        let estimate = pricing::estimate(&messages, &pricing, translation.max_input_tokens);
        info!(
            "Translating to {} with {}: ~{} input tokens, estimated input cost ${:.6}",
            language, model, estimate.input_tokens, estimate.input_cost_usd
        );
        if options.verbose {
            self.dump_messages(&messages);
        }

        if options.dry_run {
            if !estimate.within_budget() {
                warn!(
                    "Estimated input tokens ({}) exceed the maximum of {}; a real run would be refused",
                    estimate.input_tokens, estimate.max_input_tokens
                );
            }
            info!("Dry run: no request sent, no file written");
            return Ok(RunOutcome::DryRun {
                output_path,
                runs: extracted.len(),
                estimate,
            });
        }

        estimate.enforce()?;

        // Translation
        let api_key = api_key.unwrap_or_default();
        let service = TranslationService::new((self.connector)(api_key.as_str()), TranslationOptions::from(translation));
        let spinner = self.spinner(&format!("Waiting for {}", model));
        let result = service.complete_messages(model, messages).await;
        spinner.finish_and_clear();
        let output = result?;
        debug!("Model answered in {:?} after {} attempt(s)", output.duration, output.attempts);

        if options.verbose {
            self.confirmation.present(&format!("Raw response:\n{}\n", output.text));
        }

        // Reconciliation
        let (blocks, mismatch) = self.reconcile(&output.text, &texts, delimiter).into_parts();

        // Reattach formatting and write
        let runs = document::pair_blocks(&blocks, &slots);
        if options.verbose {
            self.confirmation.present(&Self::render_runs(&runs));
        }
        let runs_written = writer.write(&output_path, &runs)?;

        let usage_cost_usd = output.usage.map(|usage| {
            let cost = pricing::usage_cost(&usage, &pricing);
            info!(
                "Usage: {} prompt + {} completion tokens, cost ${:.6}",
                usage.prompt_tokens, usage.completion_tokens, cost
            );
            cost
        });

        info!(
            "Wrote {} runs to {:?} in {:.1}s",
            runs_written,
            output_path,
            start_time.elapsed().as_secs_f64()
        );

        Ok(RunOutcome::Completed {
            output_path,
            runs_written,
            mismatch,
            usage_cost_usd,
        })
    }

    fn output_path(&self, options: &RunOptions) -> PathBuf {
        options.output.clone().unwrap_or_else(|| {
            FileManager::generate_output_path(
                &options.input,
                &self.config.document.output_dir,
                &self.config.document.output_suffix,
            )
        })
    }

    fn check_input(&self, input: &Path) -> Result<(), AppError> {
        match FileManager::detect_file_type(input) {
            Ok(FileType::Docx) => Ok(()),
            Ok(other) => {
                warn!("Input {:?} does not look like a .docx file ({:?})", input, other);
                Ok(())
            }
            Err(e) => Err(AppError::File(e.to_string())),
        }
    }

    /// Split the response and surface a block-count mismatch to the operator
    fn reconcile(&self, raw: &str, texts: &[&str], delimiter: &Delimiter) -> protocol::Reconciliation {
        let reconciliation = protocol::reconcile(raw, texts.len(), delimiter);
        if reconciliation.is_mismatch() {
            warn!(
                "Structural mismatch: sent {} blocks, received {}. Output runs will be paired up to the shorter side",
                reconciliation.expected(),
                reconciliation.actual()
            );
            if self.confirmation.confirm("Show the input/output block comparison?") {
                let rows = protocol::compare_blocks(texts, reconciliation.blocks());
                self.confirmation.present(&protocol::render_comparison(&rows));
            }
        }
        reconciliation
    }

    fn dump_messages(&self, messages: &[OpenAIMessage]) {
        match serde_json::to_string_pretty(messages) {
            Ok(json) => self.confirmation.present(&format!("Messages:\n{}\n", json)),
            Err(e) => warn!("Failed to serialize messages: {}", e),
        }
    }

    fn render_runs(runs: &[OutputRun]) -> String {
        runs.iter()
            .enumerate()
            .map(|(index, run)| format!("[{}] {} | {}\n", index, run.text, run.format))
            .collect()
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
