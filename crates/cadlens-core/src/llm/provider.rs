//! Provider trait, request/response types, and the provider lookup table.
//!
//! Every backend is driven through the same `invoke(image, prompt, model)`
//! call. Which backend serves a run is decided once, from the selected model's
//! catalogue entry, via [`ProviderTable::resolve`].

use crate::config::Config;
use crate::error::{AnalysisError, ConfigError, RunResult};
use crate::registry::{ModelDescriptor, ModelRegistry, ProviderKind};
use async_trait::async_trait;
use base64::Engine;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Base64-encoded image ready to send to a provider API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Wrap canonical PNG bytes.
    pub fn png(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: "image/png".to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Sampling parameters shared by every call, analysis and synthesis alike,
/// so outputs stay comparable across passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

pub const ANALYSIS_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.4,
    top_p: 0.95,
    top_k: 40,
    max_output_tokens: 8192,
};

/// The text a provider produced for one call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier reported by the provider (or the one requested)
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that both provider variants implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini", "openrouter").
    fn name(&self) -> &str;

    /// Send one prompt about one image to `model_id`.
    async fn invoke(
        &self,
        image: &ImageInput,
        prompt: &str,
        model_id: &str,
    ) -> RunResult<LlmResponse>;

    /// Explicit per-request timeout, or `None` to rely on the transport default.
    fn timeout(&self) -> Option<Duration>;
}

/// Map a failed send into a transport error, naming the timeout if it fired.
///
/// Request timeouts stay per-pass failures, so they are reported as
/// `Transport` rather than the run-level `Timeout`.
pub(crate) fn send_error(
    provider: &str,
    err: &reqwest::Error,
    timeout: Option<Duration>,
) -> AnalysisError {
    let message = match timeout {
        Some(limit) if err.is_timeout() => format!(
            "{provider} request timed out after {}ms",
            limit.as_millis()
        ),
        _ => format!("{provider} request failed: {err}"),
    };
    AnalysisError::transport(message, None)
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Lookup table from provider kind to the adapter serving it.
#[derive(Clone, Default)]
pub struct ProviderTable {
    providers: HashMap<ProviderKind, Arc<dyn VisionProvider>>,
}

impl ProviderTable {
    /// An empty table. Runs against it fail to resolve until providers are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the adapter for `kind`.
    pub fn with(mut self, kind: ProviderKind, provider: Arc<dyn VisionProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Build both adapters from config.
    ///
    /// The Gemini key is required here; the OpenRouter key may be absent and
    /// is only checked when a chat-completions call is attempted.
    pub fn from_config(config: &Config, registry: Arc<ModelRegistry>) -> Result<Self, ConfigError> {
        let gemini_cfg = &config.providers.gemini;
        let gemini_key = resolve_env_var(&gemini_cfg.api_key).ok_or_else(|| {
            ConfigError::MissingCredential(
                "Gemini API key not set. Set GOOGLE_API_KEY env var.".to_string(),
            )
        })?;

        let router_cfg = &config.providers.openrouter;
        let openrouter = super::openrouter::OpenRouterProvider::new(
            &router_cfg.endpoint,
            resolve_env_var(&router_cfg.api_key),
            registry,
        )
        .with_attribution(&router_cfg.referer, &router_cfg.title)
        .with_timeout(Duration::from_millis(config.limits.request_timeout_ms));

        Ok(Self::new()
            .with(
                ProviderKind::Gemini,
                Arc::new(super::gemini::GeminiProvider::new(
                    &gemini_cfg.endpoint,
                    &gemini_key,
                )),
            )
            .with(ProviderKind::OpenRouter, Arc::new(openrouter)))
    }

    /// Pick the adapter for `model_id`.
    ///
    /// Fails when the model isn't catalogued, its provider tag is unknown, or
    /// no adapter is registered for its provider. Never falls back to another
    /// provider, since that would send the request (and key) to the wrong API.
    pub fn resolve(
        &self,
        registry: &ModelRegistry,
        model_id: &str,
    ) -> RunResult<(ModelDescriptor, Arc<dyn VisionProvider>)> {
        let unresolved = |reason: String| AnalysisError::UnresolvedProvider {
            model_id: model_id.to_string(),
            reason,
        };

        let descriptor = registry
            .describe(model_id)
            .ok_or_else(|| unresolved("model is not in the catalogue".to_string()))?;
        let kind = descriptor
            .provider_kind()
            .ok_or_else(|| unresolved(format!("unknown provider tag '{}'", descriptor.provider)))?;
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| unresolved(format!("no {kind} provider configured")))?;

        Ok((descriptor.clone(), provider.clone()))
    }
}

impl std::fmt::Debug for ProviderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.providers.keys().map(|k| k.tag()).collect();
        kinds.sort_unstable();
        f.debug_struct("ProviderTable").field("providers", &kinds).finish()
    }
}
