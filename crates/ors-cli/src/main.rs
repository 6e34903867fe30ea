//! ORS CLI - Command-line interface
//!
//! Usage:
//!   ors resolve <path> [--pretty]
//!   ors parse <text>
//!   ors evaluate <gold.json> [--min-precision 0.9]
//!   ors config

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use ors_core::{AppConfig, LoggingConfig, PropertyOwnership, RawOwnerMention};
use ors_extractor::{Evaluator, GoldCase, OwnerResolver};

#[derive(Parser)]
#[command(name = "ors")]
#[command(about = "Owner name resolution for scraped property records")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a property document or a list of mentions into an owner record
    Resolve {
        /// JSON input file, or `-` for stdin
        path: PathBuf,
        /// Pretty-print the record
        #[arg(long)]
        pretty: bool,
    },
    /// Show how a single owner string is segmented and resolved
    Parse {
        /// Raw owner string
        text: String,
    },
    /// Score the resolver against a labeled corpus
    Evaluate {
        /// Gold corpus (JSON array of cases)
        gold: PathBuf,
        /// Fail when entity precision is below this value
        #[arg(long, default_value_t = 0.0)]
        min_precision: f32,
        /// Count a match on entity kind alone
        #[arg(long)]
        kind_only: bool,
    },
    /// Print the effective configuration
    Config,
}

/// Accepted shapes for `ors resolve`
#[derive(Deserialize)]
#[serde(untagged)]
enum ResolveInput {
    Mentions(Vec<RawOwnerMention>),
    Document(PropertyOwnership),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    let resolver = OwnerResolver::with_config(&config);

    match cli.command {
        Commands::Resolve { path, pretty } => {
            let input = read_input(&path)?;
            let input: ResolveInput = serde_json::from_str(&input)
                .with_context(|| format!("Invalid owner input in {}", path.display()))?;

            let record = match input {
                ResolveInput::Mentions(mentions) => resolver.resolve_property(&mentions),
                ResolveInput::Document(document) => resolver.resolve_document(document),
            };
            tracing::info!(
                "Resolved {} groups, {} invalid entries from {}",
                record.owners_by_date.len(),
                record.invalid_owners.len(),
                path.display()
            );

            let pretty = pretty || config.output.pretty;
            println!("{}", record.to_json(config.output.null_optional_fields, pretty)?);
        }
        Commands::Parse { text } => {
            let resolution = resolver.resolve_segments(&text);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::Evaluate {
            gold,
            min_precision,
            kind_only,
        } => {
            let cases = GoldCase::load(&gold)?;
            tracing::info!("Loaded {} gold cases from {}", cases.len(), gold.display());

            let metrics = Evaluator::new()
                .with_kind_matching_only(kind_only)
                .evaluate_corpus(&resolver, &cases);
            println!("{}", metrics.report());

            if !metrics.meets_threshold(min_precision) {
                bail!(
                    "Precision {:.3} is below the required {:.3}",
                    metrics.entity_metrics.precision(),
                    min_precision
                );
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::from_env().context("Invalid environment configuration")?,
    };
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        return Ok(input);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
