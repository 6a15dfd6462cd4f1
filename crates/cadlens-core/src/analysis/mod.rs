//! Multi-pass analysis of a single drawing.
//!
//! - **passes**: the five fixed passes and their prompts
//! - **pacing**: pause policy between passes
//! - **pipeline**: sequential orchestration over one provider
//! - **synthesis**: executive summary over the successful passes

pub mod pacing;
pub mod passes;
pub mod pipeline;
pub mod synthesis;

pub use pacing::{FixedPacing, PacingPolicy};
pub use passes::{AnalysisPass, PassName};
pub use pipeline::PassPipeline;
pub use synthesis::synthesize;
