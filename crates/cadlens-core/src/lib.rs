//! CadLens Core - multi-pass CAD drawing analysis.
//!
//! CadLens sends one technical drawing to a single vision-capable language
//! model five times, each time with a prompt targeting a different facet, then
//! asks the same model for an executive summary of everything that succeeded.
//!
//! # Architecture
//!
//! ```text
//! Model id → Provider → Canonicalize → 5 passes (paced) → Synthesis → Report/JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cadlens_core::{Analyzer, Config, ImageSource};
//!
//! #[tokio::main]
//! async fn main() -> cadlens_core::Result<()> {
//!     let analyzer = Analyzer::new(Config::load()?)?;
//!     let source = ImageSource::from_path("./bracket.png");
//!
//!     let result = analyzer.analyze(&source, None).await?;
//!     println!("{}", analyzer.render(&result));
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod preprocess;
pub mod registry;
pub mod report;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

// Re-exports for convenient access
pub use analysis::{FixedPacing, PacingPolicy, PassName, PassPipeline};
pub use config::Config;
pub use error::{AnalysisError, CadLensError, ConfigError, ErrorKind, Result, RunResult};
pub use llm::{ProviderTable, VisionProvider};
pub use output::{OutputFormat, OutputWriter};
pub use preprocess::{CanonicalImage, ImageCanonicalizer, ImageSource};
pub use registry::{Capability, ModelDescriptor, ModelRegistry, ProviderKind};
pub use types::{AnalysisResult, PassFailure, PassOutput, RunStats, SynthesisOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CadLens analyzer - the main entry point for drawing analysis.
///
/// Holds no per-run state, so one instance can serve concurrent runs behind
/// an `Arc`.
pub struct Analyzer {
    config: Config,
    pipeline: PassPipeline,
}

impl Analyzer {
    /// Build an analyzer with the real provider adapters.
    ///
    /// Fails when the Gemini credential can't be resolved.
    pub fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(config.registry());
        let providers = ProviderTable::from_config(&config, registry.clone())?;
        Ok(Self::with_providers(config, registry, providers))
    }

    /// Build an analyzer around an explicit provider table.
    pub fn with_providers(
        config: Config,
        registry: Arc<ModelRegistry>,
        providers: ProviderTable,
    ) -> Self {
        tracing::debug!("Initializing CadLens v{}", VERSION);
        let canonicalizer =
            ImageCanonicalizer::new(config.canonicalize.clone(), config.limits.clone());
        let pacing = FixedPacing::new(Duration::from_millis(config.analysis.pass_delay_ms));
        let pipeline =
            PassPipeline::new(registry, providers, canonicalizer).with_pacing(Arc::new(pacing));
        Self { config, pipeline }
    }

    /// Replace the pause taken between passes.
    pub fn with_pacing(mut self, pacing: Arc<dyn PacingPolicy>) -> Self {
        self.pipeline = self.pipeline.with_pacing(pacing);
        self
    }

    /// Run the full multi-pass analysis.
    ///
    /// `model_id` falls back to `analysis.default_model` when `None`.
    pub async fn analyze(
        &self,
        source: &ImageSource,
        model_id: Option<&str>,
    ) -> RunResult<AnalysisResult> {
        let model_id = model_id.unwrap_or(&self.config.analysis.default_model);
        self.pipeline.run(source, model_id).await
    }

    /// Render a result as the plain-text report.
    pub fn render(&self, result: &AnalysisResult) -> String {
        report::render(result)
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The model catalogue this analyzer resolves against.
    pub fn registry(&self) -> &ModelRegistry {
        self.pipeline.registry()
    }
}
