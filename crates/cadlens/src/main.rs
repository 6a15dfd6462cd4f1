//! CadLens CLI - multi-pass analysis of engineering drawings.
//!
//! CadLens sends a drawing to one remote vision model five times, each pass
//! focused on a different facet (overview, technical detail, components,
//! measurements, quality), then asks the same model for an executive summary.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a drawing with the default model
//! cadlens analyze bracket.png
//!
//! # Pick a model and write JSON to a file
//! cadlens analyze bracket.png --model gemini-2.5-pro --format json -o bracket.json
//!
//! # Browse the model catalogue
//! cadlens models list
//!
//! # View configuration
//! cadlens config show
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// CadLens - multi-pass engineering drawing analysis.
#[derive(Parser, Debug)]
#[command(name = "cadlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "CADLENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a drawing and print the report
    Analyze(cli::analyze::AnalyzeArgs),

    /// Browse the model catalogue
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match load_config(cli.config.as_deref(), &cli.command) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `cadlens config path`."
            );
            cadlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("CadLens v{}", cadlens_core::VERSION);

    match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, config).await,
        Commands::Models(args) => cli::models::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()),
    }
}

/// Load the `--config` file, or the default one.
///
/// `config init` may name a file that doesn't exist yet; defaults stand in
/// for it.
fn load_config(
    path: Option<&Path>,
    command: &Commands,
) -> Result<cadlens_core::Config, cadlens_core::ConfigError> {
    let Some(path) = path else {
        return cadlens_core::Config::load();
    };
    let path = cli::expand_path(path);
    let creates_file = matches!(
        command,
        Commands::Config(args) if matches!(args.command, cli::config::ConfigCommand::Init { .. })
    );
    if creates_file && !path.exists() {
        return Ok(cadlens_core::Config::default());
    }
    cadlens_core::Config::load_from(&path)
}
