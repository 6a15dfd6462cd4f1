//! The `cadlens analyze` command.

use anyhow::Context;
use cadlens_core::{report, Analyzer, Config, ImageSource, OutputFormat, OutputWriter};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use super::expand_path;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Drawing to analyze (PNG, JPEG, GIF, BMP, TIFF, WebP)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Model id (see `cadlens models list`); defaults to `analysis.default_model`
    #[arg(short, long, env = "CADLENS_MODEL")]
    pub model: Option<String>,

    /// Output format; defaults to `output.format`
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pause between passes in milliseconds
    #[arg(long)]
    pub pass_delay_ms: Option<u64>,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Plain-text analysis report
    Text,
    /// Full result as JSON
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => OutputFormat::Text,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}

/// Execute the analyze command.
///
/// Only run-level failures (unreadable image, unknown model, missing Gemini
/// key) make this return an error; failed passes are logged and reported.
pub async fn execute(args: AnalyzeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(delay) = args.pass_delay_ms {
        config.analysis.pass_delay_ms = delay;
    }
    let format = resolve_format(args.format, &config);
    let pretty = config.output.pretty;
    let model_id = args
        .model
        .unwrap_or_else(|| config.analysis.default_model.clone());
    let input = expand_path(&args.input);

    let analyzer = Analyzer::new(config)?;
    if let Some(model) = analyzer.registry().describe(&model_id) {
        tracing::info!("Model: {} ({})", model.name, model.provider);
    }

    let spinner = create_spinner(&format!("Analyzing {}", input.display()));
    let outcome = analyzer
        .analyze(&ImageSource::from_path(&input), Some(&model_id))
        .await;
    spinner.finish_and_clear();

    let result = outcome.with_context(|| format!("Analysis of {} failed", input.display()))?;
    tracing::info!("{}", report::outcome_line(&result));

    if let Some(output_path) = args.output {
        let output_path = expand_path(&output_path);
        let file = File::create(&output_path)
            .with_context(|| format!("Cannot create {}", output_path.display()))?;
        let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
        writer.write_result(&result)?;
        writer.flush()?;
        tracing::info!("Output written to {:?}", output_path);
    } else {
        let stdout = std::io::stdout();
        let mut writer = OutputWriter::new(stdout.lock(), format, pretty);
        writer.write_result(&result)?;
        writer.flush()?;
    }

    Ok(())
}

/// CLI flag wins; otherwise the configured format, falling back to text.
fn resolve_format(flag: Option<ReportFormat>, config: &Config) -> OutputFormat {
    match flag {
        Some(format) => format.into(),
        None => OutputFormat::parse(&config.output.format).unwrap_or(OutputFormat::Text),
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
