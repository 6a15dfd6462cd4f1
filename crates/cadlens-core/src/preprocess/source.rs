//! Where a drawing comes from: a file on disk or an in-memory buffer.

use std::path::PathBuf;

use crate::error::{AnalysisError, RunResult};

use super::validate::Validator;

/// A readable image source.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on disk
    Path(PathBuf),
    /// Already-loaded bytes (e.g., an upload), with a display name
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Bytes {
            name: name.into(),
            data,
        }
    }

    /// Display name used in results and error messages.
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    /// Validate the source and load its raw bytes.
    pub(crate) async fn load(&self, validator: &Validator) -> RunResult<Vec<u8>> {
        match self {
            Self::Path(path) => {
                validator.validate_path(path)?;
                tokio::fs::read(path)
                    .await
                    .map_err(|e| AnalysisError::Decode {
                        source_name: self.name(),
                        message: format!("Cannot read file: {e}"),
                    })
            }
            Self::Bytes { name, data } => {
                validator.validate_bytes(data, name)?;
                Ok(data.clone())
            }
        }
    }
}
