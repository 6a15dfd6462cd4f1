//! Output formatting: rendered text report or JSON.

use serde::Serialize;
use std::io::{self, Write};

use crate::report;
use crate::types::AnalysisResult;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The plain-text analysis report
    Text,
    /// The full `AnalysisResult` as JSON
    Json,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "report" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A writer that emits analysis results as a report or as JSON.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON output.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    /// Write one analysis result.
    pub fn write_result(&mut self, result: &AnalysisResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.writer.write_all(report::render(result).as_bytes())?;
                writeln!(self.writer)
            }
            OutputFormat::Json => self.write_json(result),
        }
    }

    /// Write any serializable item as JSON, ignoring the text format.
    pub fn write_json<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
