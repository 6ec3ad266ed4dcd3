// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use docx_translate::app_config::{self, Config};
use docx_translate::app_controller::{Controller, RunOptions, RunOutcome};
use docx_translate::confirmation::{ConfirmationProvider, ConsoleConfirmation, FixedConfirmation};
use docx_translate::providers::openai::OpenAI;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the models accepted by --model, with prices per million tokens
    Models,

    /// Generate shell completions for docx-translate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// docx-translate - translate Word documents with an LLM, keeping run formatting
#[derive(Parser, Debug)]
#[command(name = "docx-translate")]
#[command(version)]
#[command(about = "Translate .docx documents with a chat completion model while keeping run formatting")]
#[command(long_about = "docx-translate sends every text run of a .docx document to a chat completion model
in one request and writes a new document with the original formatting reattached.

EXAMPLES:
    docx-translate report.docx                       # Translate to the configured language
    docx-translate report.docx -l de -m gpt-4o       # German, with a specific model
    docx-translate report.docx --dry-run -v          # Show payload and cost estimate only
    docx-translate report.docx -o out.docx --yes     # Overwrite out.docx without asking
    docx-translate models                            # List accepted models and prices
    docx-translate completions bash > dt.bash        # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json by default. You can specify a different
    file with --config. If the file doesn't exist, built-in defaults are used.

    The API key is read from OPENAI_API_KEY, or from the openai_api_key entry of
    the per-user secrets.json in the docx-translate config directory.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .docx document
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output document (default: <output_dir>/<name>_translated.docx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model to use, must be listed by `docx-translate models`
    #[arg(short, long)]
    model: Option<String>,

    /// Target language, name or ISO code (e.g. 'Lithuanian', 'de')
    #[arg(short, long = "lang")]
    lang: Option<String>,

    /// Echo messages, the raw response and the final run pairs
    #[arg(short, long)]
    verbose: bool,

    /// Extract, pack and estimate cost without calling the model or writing output
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Answer yes to every prompt
    #[arg(short, long, conflicts_with = "non_interactive")]
    yes: bool,

    /// Never read from stdin; every prompt takes its default (no)
    #[arg(long)]
    non_interactive: bool,
}

// @struct: Custom logger implementation
//
// Filtering is left to `log::max_level`, which is raised or lowered once the
// configuration has been read.
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "docx-translate", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).into());
    }

    let config = Config::load(&cli.config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config_path))?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    let confirmation: Box<dyn ConfirmationProvider> = if cli.yes {
        Box::new(FixedConfirmation::yes())
    } else if cli.non_interactive {
        Box::new(FixedConfirmation::no())
    } else {
        Box::new(ConsoleConfirmation)
    };

    let controller = Controller::with_config(config, confirmation)?.with_progress(true);

    if let Some(Commands::Models) = cli.command {
        return list_models(&controller);
    }

    let input = cli
        .input
        .ok_or_else(|| anyhow!("INPUT is required when no subcommand is specified"))?;

    let options = RunOptions {
        input,
        output: cli.output,
        model: cli.model,
        language: cli.lang,
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    match controller.run(options).await? {
        RunOutcome::Completed {
            output_path,
            runs_written,
            mismatch,
            ..
        } => {
            if mismatch {
                info!("Done with a structural mismatch: {} runs written to {:?}", runs_written, output_path);
            } else {
                info!("Success: {:?}", output_path);
            }
        }
        RunOutcome::DryRun { runs, estimate, .. } => {
            info!(
                "Dry run complete: {} runs, ~{} input tokens (limit {}), ~${:.6}",
                runs, estimate.input_tokens, estimate.max_input_tokens, estimate.input_cost_usd
            );
        }
        RunOutcome::Aborted { .. } => {}
    }

    Ok(())
}

fn list_models(controller: &Controller<OpenAI>) -> Result<()> {
    let models = controller.available_models()?;
    let width = models.iter().map(|(name, _)| name.len()).max().unwrap_or(5).max(5);

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{:<width$}  {:>12}  {:>12}", "MODEL", "INPUT $/1M", "OUTPUT $/1M", width = width)?;
    for (name, pricing) in models {
        let marker = if name == controller.config().translation.model { " (default)" } else { "" };
        writeln!(
            stdout,
            "{:<width$}  {:>12.3}  {:>12.3}{}",
            name,
            pricing.input_tokens,
            pricing.output_tokens,
            marker,
            width = width
        )?;
    }
    Ok(())
}
