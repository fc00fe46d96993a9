//! parto-import: load the Parto static hotel content dump into ArangoDB

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parto_import::config::{Config, LogFormat, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "parto-import")]
#[command(about = "Load the Parto static hotel content dump into ArangoDB")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory containing the provider JSON files
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// ArangoDB endpoint (e.g. http://localhost:8529)
    #[arg(long)]
    endpoint: Option<String>,

    /// Database name
    #[arg(long)]
    database: Option<String>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full import pipeline
    Run {
        /// Import into an in-memory store instead of the database
        #[arg(long)]
        dry_run: bool,

        /// Disable progress bars and the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write a template configuration file
    Init {
        /// Directory to write the configuration into
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show document counts of the imported collections
    Stats,

    /// Verify the input directory without touching the database
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        init_logging(&Config::default(), cli.verbose)?;
        return commands::init::init_config(path.clone()).await;
    }

    let config = load_config(&cli)
        .context("Invalid configuration, check the configuration file and command-line options")?;
    init_logging(&config, cli.verbose)?;

    match cli.command {
        Commands::Run { dry_run, quiet } => commands::run::run_import(config, dry_run, quiet).await,
        Commands::Stats => commands::stats::show_stats(config).await,
        Commands::Check => commands::check::check_input(config).await,
        Commands::Init { .. } => Ok(()),
    }
}

/// Load the config file if present, apply CLI overrides and validate
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    if let Some(ref input) = cli.input {
        config.input.base_path = input.clone();
    }
    if let Some(ref endpoint) = cli.endpoint {
        config.database.endpoint = endpoint.clone();
    }
    if let Some(ref database) = cli.database {
        config.database.database = database.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let level = config.logging.effective_level(verbose).to_tracing();
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false);

    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}
