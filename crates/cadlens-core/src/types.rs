//! Data types produced by an analysis run.
//!
//! An [`AnalysisResult`] is owned by exactly one run; nothing in it is shared
//! with other runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::PassName;
use crate::error::{AnalysisError, ErrorKind};
use crate::registry::ModelDescriptor;

/// Character budget for failure messages in log lines.
const LOG_MESSAGE_CHARS: usize = 100;

/// Text a single successful pass produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassOutput {
    /// The model's answer
    pub text: String,

    /// Length of `text` in characters
    pub length: usize,

    /// Tokens reported by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,

    /// Round-trip time of the call
    pub latency_ms: u64,
}

/// A pass that did not produce text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassFailure {
    pub pass: PassName,
    pub kind: ErrorKind,
    /// Full error description
    pub error: String,
}

impl PassFailure {
    pub fn new(pass: PassName, error: &AnalysisError) -> Self {
        Self {
            pass,
            kind: error.kind(),
            error: error.to_string(),
        }
    }

    /// The error description cut to a log-friendly length.
    pub fn short_message(&self) -> String {
        truncate_chars(&self.error, LOG_MESSAGE_CHARS)
    }
}

/// Result of one pass, created exactly once per attempted pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Success { pass: PassName, output: PassOutput },
    Failure(PassFailure),
}

/// Result of the synthesis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Completed {
        executive_summary: String,
        /// Characters of combined pass text fed into synthesis
        total_analysis_length: usize,
    },
    Failed {
        /// Fixed fallback text
        executive_summary: String,
        kind: ErrorKind,
        error: String,
    },
}

impl SynthesisOutcome {
    /// Summary text placed in `Failed` outcomes.
    pub const FALLBACK_SUMMARY: &'static str = "Synthesis failed";

    pub fn failed(error: &AnalysisError) -> Self {
        SynthesisOutcome::Failed {
            executive_summary: Self::FALLBACK_SUMMARY.to_string(),
            kind: error.kind(),
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SynthesisOutcome::Completed { .. })
    }

    pub fn executive_summary(&self) -> &str {
        match self {
            SynthesisOutcome::Completed {
                executive_summary, ..
            }
            | SynthesisOutcome::Failed {
                executive_summary, ..
            } => executive_summary,
        }
    }
}

/// Timing and usage figures for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub canonicalize_ms: u64,
    pub passes_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis_ms: Option<u64>,
    pub total_ms: u64,
    /// Sum of provider-reported token counts
    pub tokens_used: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    // === Source ===
    /// Path or caller-supplied name of the drawing
    pub image: String,

    /// BLAKE3 hash of the canonical PNG bytes
    pub content_hash: String,

    /// Canonical width in pixels
    pub width: u32,

    /// Canonical height in pixels
    pub height: u32,

    // === Model ===
    pub model_used: String,

    pub model_info: ModelDescriptor,

    // === Outcomes ===
    /// Successful passes, keyed and ordered by pass
    pub analyses: BTreeMap<PassName, PassOutput>,

    /// Absent when no pass succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SynthesisOutcome>,

    /// Failed passes in run order
    pub errors: Vec<PassFailure>,

    pub stats: RunStats,
}

impl AnalysisResult {
    /// An empty result for a run that has canonicalized its image but not yet
    /// run any pass.
    pub fn new(
        image: String,
        content_hash: String,
        (width, height): (u32, u32),
        model: ModelDescriptor,
    ) -> Self {
        Self {
            image,
            content_hash,
            width,
            height,
            model_used: model.id.clone(),
            model_info: model,
            analyses: BTreeMap::new(),
            summary: None,
            errors: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// File a pass outcome under its pass name.
    pub fn record(&mut self, outcome: PassOutcome) {
        match outcome {
            PassOutcome::Success { pass, output } => {
                if let Some(tokens) = output.tokens_used {
                    self.stats.tokens_used += u64::from(tokens);
                }
                self.analyses.insert(pass, output);
            }
            PassOutcome::Failure(failure) => self.errors.push(failure),
        }
    }

    pub fn passes_attempted(&self) -> usize {
        self.analyses.len() + self.errors.len()
    }

    pub fn has_successes(&self) -> bool {
        !self.analyses.is_empty()
    }

    /// The executive summary, only when synthesis completed with text.
    pub fn executive_summary(&self) -> Option<&str> {
        match &self.summary {
            Some(SynthesisOutcome::Completed {
                executive_summary, ..
            }) if !executive_summary.is_empty() => Some(executive_summary),
            _ => None,
        }
    }
}

/// Truncate to at most `max` characters, marking the cut with "...".
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
