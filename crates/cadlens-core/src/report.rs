//! Plain-text report rendering.
//!
//! The report is meant for indexing into a retrieval store, so it carries
//! only the model identity, the executive summary and the successful pass
//! texts. Failed passes never appear.

use std::fmt::Write;

use crate::types::AnalysisResult;

const WIDTH: usize = 80;

/// Render a result as one linear document.
pub fn render(result: &AnalysisResult) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let mut lines: Vec<String> = vec![
        heavy.clone(),
        "COMPREHENSIVE CAD DRAWING ANALYSIS".to_string(),
        heavy.clone(),
        String::new(),
        format!("Model: {}", result.model_info.name),
        format!("Provider: {}", result.model_info.provider),
        String::new(),
    ];

    if let Some(summary) = result.executive_summary() {
        lines.push("EXECUTIVE SUMMARY".to_string());
        lines.push(light.clone());
        lines.push(summary.to_string());
        lines.push(String::new());
    }

    lines.push("DETAILED ANALYSES".to_string());
    lines.push(heavy);
    lines.push(String::new());

    for (pass, output) in &result.analyses {
        lines.push(format!("\n{} ANALYSIS", pass.label()));
        lines.push(light.clone());
        lines.push(output.text.clone());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One-line outcome summary for logs and the CLI.
pub fn outcome_line(result: &AnalysisResult) -> String {
    let mut line = String::new();
    let _ = write!(
        line,
        "{}: {}/{} passes succeeded",
        result.image,
        result.analyses.len(),
        result.passes_attempted()
    );
    match &result.summary {
        Some(summary) if summary.is_success() => line.push_str(", summary ready"),
        Some(_) => line.push_str(", synthesis failed"),
        None => line.push_str(", synthesis skipped"),
    }
    line
}
