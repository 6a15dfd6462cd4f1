//! Pass pipeline: resolve provider → canonicalize → five passes → synthesis.

use std::sync::Arc;
use std::time::Instant;

use crate::error::RunResult;
use crate::llm::{ImageInput, ProviderTable, VisionProvider};
use crate::preprocess::{ImageCanonicalizer, ImageSource};
use crate::registry::{Capability, ModelRegistry};
use crate::types::{AnalysisResult, PassFailure, PassOutcome, PassOutput};

use super::pacing::{FixedPacing, PacingPolicy};
use super::passes::AnalysisPass;
use super::synthesis::synthesize;

/// Runs every pass of one analysis against a single provider.
pub struct PassPipeline {
    registry: Arc<ModelRegistry>,
    providers: ProviderTable,
    canonicalizer: ImageCanonicalizer,
    pacing: Arc<dyn PacingPolicy>,
    passes: [AnalysisPass; 5],
}

impl PassPipeline {
    pub fn new(
        registry: Arc<ModelRegistry>,
        providers: ProviderTable,
        canonicalizer: ImageCanonicalizer,
    ) -> Self {
        Self {
            registry,
            providers,
            canonicalizer,
            pacing: Arc::new(FixedPacing::default()),
            passes: AnalysisPass::standard(),
        }
    }

    /// Replace the pause taken between passes.
    pub fn with_pacing(mut self, pacing: Arc<dyn PacingPolicy>) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Analyze one drawing with `model_id`.
    ///
    /// Fails only before the first pass: when the model can't be resolved to
    /// a provider, or the image can't be read or decoded. Pass and synthesis
    /// errors are recorded in the result instead.
    pub async fn run(&self, source: &ImageSource, model_id: &str) -> RunResult<AnalysisResult> {
        let start = Instant::now();

        let (model, provider) = self.providers.resolve(&self.registry, model_id)?;
        if !model.has_capability(Capability::Vision) {
            tracing::warn!(
                "{} has no vision capability; passes will not see the drawing",
                model.name
            );
        }
        tracing::info!(
            "Analyzing {} with {} ({})",
            source.name(),
            model.name,
            model.provider
        );

        let canonical = self.canonicalizer.canonicalize(source).await?;
        let canonicalize_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Canonicalized to {}x{} ({} bytes{}) in {}ms",
            canonical.width,
            canonical.height,
            canonical.bytes.len(),
            if canonical.was_resized() { ", downscaled" } else { "" },
            canonicalize_ms
        );

        let image = ImageInput::png(&canonical.bytes);
        let mut result = AnalysisResult::new(
            source.name(),
            canonical.content_hash,
            (canonical.width, canonical.height),
            model,
        );
        result.stats.canonicalize_ms = canonicalize_ms;

        let passes_start = Instant::now();
        let total = self.passes.len();
        for (idx, pass) in self.passes.iter().enumerate() {
            if idx > 0 {
                self.pacing.between_passes().await;
            }
            tracing::info!("Pass {}/{}: {}", idx + 1, total, pass.name.label());

            let outcome = run_pass(provider.as_ref(), &image, pass, model_id).await;
            match &outcome {
                PassOutcome::Success { pass, output } => {
                    tracing::info!("{} complete ({} chars)", pass.label(), output.length);
                }
                PassOutcome::Failure(failure) => {
                    tracing::warn!(
                        "{} failed: {}",
                        failure.pass.label(),
                        failure.short_message()
                    );
                }
            }
            result.record(outcome);
        }
        result.stats.passes_ms = passes_start.elapsed().as_millis() as u64;

        if result.has_successes() {
            tracing::info!(
                "Synthesizing executive summary from {} passes",
                result.analyses.len()
            );
            let synthesis_start = Instant::now();
            let outcome = synthesize(&result.analyses, provider.as_ref(), &image, model_id).await;
            result.stats.synthesis_ms = Some(synthesis_start.elapsed().as_millis() as u64);
            result.summary = Some(outcome);
        } else {
            tracing::warn!("All {} passes failed; skipping synthesis", total);
        }

        result.stats.total_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Analysis of {} finished in {}ms ({} ok, {} failed)",
            result.image,
            result.stats.total_ms,
            result.analyses.len(),
            result.errors.len()
        );

        Ok(result)
    }
}

async fn run_pass(
    provider: &dyn VisionProvider,
    image: &ImageInput,
    pass: &AnalysisPass,
    model_id: &str,
) -> PassOutcome {
    match provider.invoke(image, pass.prompt, model_id).await {
        Ok(response) => PassOutcome::Success {
            pass: pass.name,
            output: PassOutput {
                length: response.text.chars().count(),
                text: response.text,
                tokens_used: response.tokens_used,
                latency_ms: response.latency_ms,
            },
        },
        Err(e) => PassOutcome::Failure(PassFailure::new(pass.name, &e)),
    }
}
