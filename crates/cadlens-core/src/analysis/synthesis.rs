//! Executive-summary synthesis over the successful passes.
//!
//! Runs against the same adapter, model and image bytes as the passes, so the
//! summary stays grounded in the drawing rather than only in prior answers.

use std::collections::BTreeMap;

use crate::llm::{ImageInput, VisionProvider};
use crate::types::{PassOutput, SynthesisOutcome};

use super::PassName;

/// Render successful pass outputs as `=== NAME ===` blocks, in pass order.
pub fn combined_input(analyses: &BTreeMap<PassName, PassOutput>) -> String {
    analyses
        .iter()
        .map(|(pass, output)| format!("=== {} ===\n{}", pass.label(), output.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The synthesis prompt wrapped around the combined pass text.
pub fn synthesis_prompt(combined: &str) -> String {
    format!(
        "Based on these CAD drawing analyses, create a concise executive summary:\n\n\
         {combined}\n\n\
         Provide:\n\
         1. **Drawing Identity**: Type, purpose, application\n\
         2. **Key Specifications**: Most critical dimensions/specs\n\
         3. **Notable Features**: Top 5-7 important elements\n\
         4. **Technical Assessment**: Quality and completeness rating\n\
         5. **Critical Information**: Must-know details\n\n\
         Be concise but complete."
    )
}

/// Produce the executive summary. Never fails the run: provider errors come
/// back as [`SynthesisOutcome::Failed`].
pub async fn synthesize(
    analyses: &BTreeMap<PassName, PassOutput>,
    provider: &dyn VisionProvider,
    image: &ImageInput,
    model_id: &str,
) -> SynthesisOutcome {
    let combined = combined_input(analyses);
    let prompt = synthesis_prompt(&combined);

    match provider.invoke(image, &prompt, model_id).await {
        Ok(response) => {
            tracing::info!("Executive summary complete ({} chars)", response.text.chars().count());
            SynthesisOutcome::Completed {
                executive_summary: response.text,
                total_analysis_length: combined.chars().count(),
            }
        }
        Err(e) => {
            tracing::error!("Synthesis failed: {e}");
            SynthesisOutcome::failed(&e)
        }
    }
}
