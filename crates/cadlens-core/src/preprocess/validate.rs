//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{AnalysisError, RunResult};

/// Cheap checks that reject obviously bad input before the expensive decode.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check that a file exists, is within the size limit, and looks like an image.
    pub fn validate_path(&self, path: &Path) -> RunResult<()> {
        if !path.exists() {
            return Err(AnalysisError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| AnalysisError::Decode {
            source_name: path.display().to_string(),
            message: format!("Cannot read metadata: {e}"),
        })?;
        self.check_size(metadata.len(), path)?;

        let mut header = [0u8; 12];
        let bytes_read = std::fs::File::open(path)
            .and_then(|mut file| file.read(&mut header))
            .map_err(|e| AnalysisError::Decode {
                source_name: path.display().to_string(),
                message: format!("Cannot open file: {e}"),
            })?;
        Self::check_header(&header[..bytes_read], &path.display().to_string())
    }

    /// Same checks for an in-memory buffer.
    pub fn validate_bytes(&self, data: &[u8], name: &str) -> RunResult<()> {
        self.check_size(data.len() as u64, Path::new(name))?;
        Self::check_header(&data[..data.len().min(12)], name)
    }

    fn check_size(&self, len: u64, path: &Path) -> RunResult<()> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if len > max_bytes {
            return Err(AnalysisError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    fn check_header(header: &[u8], name: &str) -> RunResult<()> {
        if header.len() < 4 {
            return Err(AnalysisError::Decode {
                source_name: name.to_string(),
                message: "File too small to be a valid image".to_string(),
            });
        }
        if !Self::is_supported_header(header) {
            return Err(AnalysisError::Decode {
                source_name: name.to_string(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }

    /// Magic bytes of the formats the decoder can read.
    fn is_supported_header(header: &[u8]) -> bool {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => true,               // JPEG
            [0x89, b'P', b'N', b'G', ..] => true,         // PNG
            [b'G', b'I', b'F', b'8', ..] => true,         // GIF
            [b'B', b'M', ..] => true,                     // BMP
            [b'I', b'I', 0x2A, 0x00, ..] => true,         // TIFF little-endian
            [b'M', b'M', 0x00, 0x2A, ..] => true,         // TIFF big-endian
            [b'R', b'I', b'F', b'F', _, _, _, _, rest @ ..] => {
                // WebP needs the full 12 bytes to confirm; a short RIFF header gets the benefit of the doubt
                rest.len() < 4 || rest.starts_with(b"WEBP")
            }
            [b'R', b'I', b'F', b'F', ..] => true,
            _ => false,
        }
    }
}
