//! CodeCriteria CLI
//!
//! Evaluates alert criteria against recorded custom-code monitor results.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use codecriteria::models::{CheckOn, CriteriaFilter, CriteriaInstance, MonitorResponse};
use codecriteria::{Config, CustomCodeCriteria};

/// CodeCriteria - alert criteria for custom-code monitors
#[derive(Parser)]
#[command(name = "codecriteria")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CODECRITERIA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single criteria rule against a monitor response
    Evaluate {
        /// Monitor response JSON file
        #[arg(long)]
        response: PathBuf,

        /// Criteria rule JSON file
        #[arg(long)]
        rule: PathBuf,
    },

    /// Evaluate a criteria instance (a group of rules)
    Instance {
        /// Monitor response JSON file
        #[arg(long)]
        response: PathBuf,

        /// Criteria instance JSON file
        #[arg(long)]
        criteria: PathBuf,
    },

    /// Check that a rule or criteria instance can fire
    Validate {
        /// Criteria rule JSON file
        #[arg(long, conflicts_with = "criteria", required_unless_present = "criteria")]
        rule: Option<PathBuf>,

        /// Criteria instance JSON file
        #[arg(long)]
        criteria: Option<PathBuf>,
    },

    /// List the operators each check target accepts
    Operators,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config, cli.verbose);

    let result = match cli.command {
        Commands::Evaluate { response, rule } => {
            run_evaluate(&config, &response, &rule, cli.format).await
        }
        Commands::Instance { response, criteria } => {
            run_instance(&config, &response, &criteria, cli.format).await
        }
        Commands::Validate { rule, criteria } => run_validate(rule, criteria, cli.format).await,
        Commands::Operators => {
            run_operators(cli.format);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> codecriteria::Result<T> {
    let raw = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&raw)?)
}

async fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    read_json(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))
}

fn print_outcome(violation: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Text => match violation {
            Some(description) => println!("Criteria met: {description}"),
            None => println!("Criteria not met"),
        },
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "met": violation.is_some(), "description": violation })
            );
        }
    }
}

async fn run_evaluate(
    config: &Config,
    response: &Path,
    rule: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let response: MonitorResponse = load(response).await?;
    let rule: CriteriaFilter = load(rule).await?;

    debug!(check_on = %rule.check_on, operator = %rule.operator, "Evaluating rule");

    let evaluator = CustomCodeCriteria::from_config(&config.criteria);
    print_outcome(evaluator.evaluate(&response, &rule).as_deref(), format);
    Ok(ExitCode::SUCCESS)
}

async fn run_instance(
    config: &Config,
    response: &Path,
    criteria: &Path,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let response: MonitorResponse = load(response).await?;
    let instance: CriteriaInstance = load(criteria).await?;

    info!(filters = instance.filters.len(), "Evaluating criteria instance");

    let evaluator = CustomCodeCriteria::from_config(&config.criteria);
    print_outcome(evaluator.evaluate_instance(&response, &instance).as_deref(), format);
    Ok(ExitCode::SUCCESS)
}

async fn run_validate(
    rule: Option<PathBuf>,
    criteria: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<ExitCode> {
    let outcome = match (rule, criteria) {
        (Some(rule), _) => load::<CriteriaFilter>(&rule).await?.validate(),
        (None, Some(criteria)) => load::<CriteriaInstance>(&criteria).await?.validate(),
        (None, None) => anyhow::bail!("either --rule or --criteria is required"),
    };

    println!("{}", render_validation(&outcome, format));

    // The report above already names the problem.
    Ok(if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn render_validation(outcome: &codecriteria::Result<()>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match outcome {
            Ok(()) => "Valid".to_string(),
            Err(e) => format!("Invalid: {e}"),
        },
        OutputFormat::Json => {
            let error = outcome.as_ref().err().map(ToString::to_string);
            serde_json::json!({ "valid": outcome.is_ok(), "error": error }).to_string()
        }
    }
}

fn run_operators(format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for check_on in CheckOn::ALL {
                let operators: Vec<String> =
                    check_on.operators().iter().map(ToString::to_string).collect();
                println!("{check_on}: {}", operators.join(", "));
            }
        }
        OutputFormat::Json => {
            let table: serde_json::Map<String, serde_json::Value> = CheckOn::ALL
                .into_iter()
                .map(|check_on| (check_on.to_string(), serde_json::json!(check_on.operators())))
                .collect();
            println!("{}", serde_json::Value::Object(table));
        }
    }
}
