//! OpenRouter provider using the Chat Completions API.
//!
//! Vision-capable models get the image as a data URL next to the prompt.
//! Models without the `vision` capability get a text-only turn instead: the
//! call still succeeds, but the answer was produced without seeing the drawing.

use super::provider::{send_error, ImageInput, LlmResponse, VisionProvider, ANALYSIS_SAMPLING};
use crate::error::{AnalysisError, RunResult};
use crate::registry::{Capability, ModelRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// OpenRouter provider using Chat Completions.
pub struct OpenRouterProvider {
    api_key: Option<String>,
    endpoint: String,
    referer: Option<String>,
    title: Option<String>,
    timeout: Duration,
    registry: Arc<ModelRegistry>,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// `endpoint` is the API base; `/chat/completions` is appended.
    pub fn new(endpoint: &str, api_key: Option<String>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            api_key,
            endpoint: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            referer: None,
            title: None,
            timeout: Duration::from_secs(120),
            registry,
            client: reqwest::Client::new(),
        }
    }

    /// Set the `HTTP-Referer` / `X-Title` identification headers.
    pub fn with_attribution(mut self, referer: &str, title: &str) -> Self {
        self.referer = Some(referer.to_string()).filter(|s| !s.is_empty());
        self.title = Some(title.to_string()).filter(|s| !s.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the single user turn for `model_id`.
    fn user_message(&self, image: &ImageInput, prompt: &str, model_id: &str) -> ChatMessage {
        let content = if self.registry.has_capability(model_id, Capability::Vision) {
            MessageContent::Parts(vec![
                ChatContent::Text {
                    text: prompt.to_string(),
                },
                ChatContent::ImageUrl {
                    image_url: ImageUrl {
                        url: image.data_url(),
                    },
                },
            ])
        } else {
            tracing::debug!("{model_id} has no vision capability, sending text-only prompt");
            MessageContent::Text(text_only_prompt(prompt))
        };

        ChatMessage {
            role: "user".to_string(),
            content,
        }
    }
}

/// Rewording used when the model cannot see the image.
pub(crate) fn text_only_prompt(prompt: &str) -> String {
    format!(
        "Based on this CAD drawing analysis prompt:\n\n{prompt}\n\nProvide a detailed technical response."
    )
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ChatContent>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u32>,
}

#[async_trait]
impl VisionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn invoke(
        &self,
        image: &ImageInput,
        prompt: &str,
        model_id: &str,
    ) -> RunResult<LlmResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AnalysisError::config(
                "OpenRouter API key not configured. Set OPENROUTER_API_KEY env var.",
            )
        })?;
        let start = Instant::now();

        let body = ChatRequest {
            model: model_id.to_string(),
            messages: vec![self.user_message(image, prompt, model_id)],
            temperature: ANALYSIS_SAMPLING.temperature,
            max_tokens: ANALYSIS_SAMPLING.max_output_tokens,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request = request.header("X-Title", title);
        }
        if let Some(timeout) = self.timeout() {
            request = request.timeout(timeout);
        }

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("OpenRouter", &e, self.timeout()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::transport(
                format!("OpenRouter HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            AnalysisError::response_shape(format!("Failed to parse OpenRouter response: {e}"))
        })?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                AnalysisError::response_shape(
                    "OpenRouter response has no text in choices[0].message.content",
                )
            })?;

        Ok(LlmResponse {
            text,
            model: chat_resp.model.unwrap_or_else(|| model_id.to_string()),
            tokens_used: chat_resp.usage.and_then(|u| u.total_tokens),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Option<Duration> {
        Some(self.timeout)
    }
}
