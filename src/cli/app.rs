//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::Output;
use super::plan;
use crate::config::{Config, OutputFormat};
use crate::intake::RequestFormat;

#[derive(Parser)]
#[command(name = "taskplan")]
#[command(author, version, about = "Deadline-aware task scheduling for project trackers")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file
    #[arg(long, global = true, env = "TASKPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the execution plan for a task set
    Plan {
        /// Request file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Request encoding; defaults to the file extension, JSON for stdin
        #[arg(long, value_enum)]
        input_format: Option<RequestFormat>,

        /// Start of the timeline (RFC 3339); defaults to the request's `now`,
        /// then the current time
        #[arg(long)]
        now: Option<String>,
    },

    /// Validate a task set and print its order without a timeline
    Check {
        /// Request file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Request encoding; defaults to the file extension, JSON for stdin
        #[arg(long, value_enum)]
        input_format: Option<RequestFormat>,
    },

    /// Show the effective configuration
    Config,
}

/// Installs the stderr log subscriber
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "taskplan=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded; keep the existing one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, source) = Config::load(cli.config.as_deref())?;
    match &source {
        Some(path) => debug!(path = %path.display(), "configuration loaded"),
        None => debug!("using built-in configuration"),
    }

    let output = Output::new(cli.format.unwrap_or(config.default_format));

    match cli.command {
        Commands::Plan {
            input,
            input_format,
            now,
        } => plan::plan(&output, &config, &input, input_format, now.as_deref())?,
        Commands::Check {
            input,
            input_format,
        } => plan::check(&output, &config, &input, input_format)?,
        Commands::Config => show_config(&output, &config, source.as_deref())?,
    }

    Ok(())
}

fn show_config(output: &Output, config: &Config, source: Option<&std::path::Path>) -> Result<()> {
    let source = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    if output.is_json() {
        output.data(&serde_json::json!({
            "source": source,
            "config": config,
        }));
    } else {
        println!("# source: {}", source);
        print!("{}", toml::to_string_pretty(config)?);
    }

    Ok(())
}
