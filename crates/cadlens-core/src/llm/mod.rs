//! Remote model providers.
//!
//! Two adapter variants sit behind the [`VisionProvider`] trait: Gemini
//! (direct multimodal API) and OpenRouter (OpenAI-style chat completions).
//! [`ProviderTable`] maps a model's provider tag to the adapter that serves it.

pub(crate) mod gemini;
pub(crate) mod openrouter;
pub(crate) mod provider;

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;
pub use provider::{
    resolve_env_var, ImageInput, LlmResponse, ProviderTable, SamplingParams, VisionProvider,
    ANALYSIS_SAMPLING,
};
