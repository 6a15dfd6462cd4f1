//! Sub-configuration structs with defaults matching the analyzer's fixed policy.

use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;

/// Analysis run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model used when the caller doesn't pick one
    pub default_model: String,

    /// Pause between consecutive passes in milliseconds
    pub pass_delay_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_model: ModelRegistry::DEFAULT_MODEL.to_string(),
            pass_delay_ms: 1000,
        }
    }
}

/// Image canonicalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizeConfig {
    /// Longest allowed edge in pixels; larger images are downscaled to it
    pub max_dimension: u32,

    /// Contrast multiplier applied before resizing
    pub contrast_factor: f32,
}

impl Default for CanonicalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: 4096,
            contrast_factor: 1.5,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input file size in megabytes
    pub max_file_size_mb: u64,

    /// Decode + canonicalize timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Chat-completions request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            // Contrast + Lanczos on a 10k-pixel scan takes a few seconds
            decode_timeout_ms: 30_000,
            request_timeout_ms: 120_000,
        }
    }
}

/// Remote provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Direct-vision provider
    pub gemini: GeminiConfig,

    /// Chat-completions provider
    pub openrouter: OpenRouterConfig,
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base (the model path is appended)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax). Required.
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GOOGLE_API_KEY}".to_string(),
        }
    }
}

/// OpenRouter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// API base (`/chat/completions` is appended)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax). Optional until a call is made.
    pub api_key: String,

    /// Sent as `HTTP-Referer` for app attribution
    pub referer: String,

    /// Sent as `X-Title` for app attribution
    pub title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            api_key: "${OPENROUTER_API_KEY}".to_string(),
            referer: "https://documind.app".to_string(),
            title: "DocuMind CAD Analyzer".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text" or "json")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
