//! Error types for the CadLens analysis pipeline.
//!
//! Errors carry enough context (file paths, model ids, HTTP status) to be
//! actionable on their own, and every analysis error maps onto an
//! [`ErrorKind`] so callers can branch on the category without parsing text.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for CadLens operations.
#[derive(Error, Debug)]
pub enum CadLensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Analysis run errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A credential required at construction time is absent
    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Errors raised while analyzing a drawing.
///
/// Run-level variants (`Decode`, `FileNotFound`, `FileTooLarge`, `Timeout`,
/// `UnresolvedProvider`) abort the run before any pass executes. The rest are
/// produced by provider calls and recorded per pass.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    /// Provider is missing a credential or is otherwise misconfigured
    #[error("{message}")]
    Config { message: String },

    /// Network failure or non-success HTTP status
    #[error("{message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// Provider answered, but not in the expected shape
    #[error("{message}")]
    ResponseShape { message: String },

    /// The image could not be decoded or re-encoded
    #[error("Decode error for {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// The selected model has no descriptor, or its provider tag is unknown
    #[error("Cannot resolve provider for model '{model_id}': {reason}")]
    UnresolvedProvider { model_id: String, reason: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {source_name} after {timeout_ms}ms")]
    Timeout {
        source_name: String,
        stage: String,
        timeout_ms: u64,
    },

    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input file exceeds the configured size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },
}

/// Coarse category of an [`AnalysisError`], serialized into pass failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Transport,
    ResponseShape,
    Decode,
    UnresolvedProvider,
    Timeout,
    Input,
}

impl AnalysisError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Config { .. } => ErrorKind::Config,
            AnalysisError::Transport { .. } => ErrorKind::Transport,
            AnalysisError::ResponseShape { .. } => ErrorKind::ResponseShape,
            AnalysisError::Decode { .. } => ErrorKind::Decode,
            AnalysisError::UnresolvedProvider { .. } => ErrorKind::UnresolvedProvider,
            AnalysisError::Timeout { .. } => ErrorKind::Timeout,
            AnalysisError::FileNotFound(_) | AnalysisError::FileTooLarge { .. } => {
                ErrorKind::Input
            }
        }
    }

    /// Whether this error aborts the whole run rather than a single pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AnalysisError::Config { .. }
                | AnalysisError::Transport { .. }
                | AnalysisError::ResponseShape { .. }
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        AnalysisError::Config {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>, status_code: Option<u16>) -> Self {
        AnalysisError::Transport {
            message: message.into(),
            status_code,
        }
    }

    pub fn response_shape(message: impl Into<String>) -> Self {
        AnalysisError::ResponseShape {
            message: message.into(),
        }
    }
}

/// Convenience type alias for CadLens results.
pub type Result<T> = std::result::Result<T, CadLensError>;

/// Convenience type alias for analysis-specific results.
pub type RunResult<T> = std::result::Result<T, AnalysisError>;
