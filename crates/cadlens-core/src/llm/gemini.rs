//! Gemini provider using the `generateContent` REST API.
//!
//! The direct-vision variant: image and prompt travel together as inline
//! parts of a single user turn.

use super::provider::{send_error, ImageInput, LlmResponse, VisionProvider, ANALYSIS_SAMPLING};
use crate::error::{AnalysisError, RunResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Gemini provider.
pub struct GeminiProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model_id)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    InlineData(Blob),
    Text(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn invoke(
        &self,
        image: &ImageInput,
        prompt: &str,
        model_id: &str,
    ) -> RunResult<LlmResponse> {
        let start = Instant::now();

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData(Blob {
                        mime_type: image.media_type.clone(),
                        data: image.data.clone(),
                    }),
                    Part::Text(prompt.to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: ANALYSIS_SAMPLING.temperature,
                top_p: ANALYSIS_SAMPLING.top_p,
                top_k: ANALYSIS_SAMPLING.top_k,
                max_output_tokens: ANALYSIS_SAMPLING.max_output_tokens,
            },
        };

        let mut request = self
            .client
            .post(self.url(model_id))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json");
        if let Some(timeout) = self.timeout() {
            request = request.timeout(timeout);
        }

        let resp = request
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error("Gemini", &e, self.timeout()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::transport(
                format!("Gemini HTTP {status}: {text}"),
                Some(status.as_u16()),
            ));
        }

        let generate_resp: GenerateResponse = resp.json().await.map_err(|e| {
            AnalysisError::response_shape(format!("Failed to parse Gemini response: {e}"))
        })?;

        let text = generate_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(AnalysisError::response_shape(
                "Gemini returned no text in the first candidate",
            ));
        }

        Ok(LlmResponse {
            text,
            model: generate_resp
                .model_version
                .unwrap_or_else(|| model_id.to_string()),
            tokens_used: generate_resp.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 1200, "totalTokenCount": 1500 },
            "modelVersion": "gemini-2.5-flash"
        })
    }

    #[test]
    fn test_request_serializes_gemini_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData(Blob {
                        mime_type: "image/png".to_string(),
                        data: "AAAA".to_string(),
                    }),
                    Part::Text("Describe".to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 8192,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "Describe");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "gm-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("A bracket.")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "gm-test");
        let response = provider
            .invoke(&ImageInput::png(&[1, 2, 3]), "What is this?", "gemini-2.5-flash")
            .await
            .unwrap();

        assert_eq!(response.text, "A bracket.");
        assert_eq!(response.tokens_used, Some(1500));

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["generationConfig"]["temperature"], 0.4);
        assert_eq!(sent["contents"][0]["parts"][1]["text"], "What is this?");
    }

    #[tokio::test]
    async fn test_invoke_http_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "gm-test");
        let err = provider
            .invoke(&ImageInput::png(&[1]), "p", "gemini-2.5-pro")
            .await
            .unwrap_err();
        match err {
            AnalysisError::Transport {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(429));
                assert!(message.contains("quota exhausted"));
            }
            other => panic!("Expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_whitespace_text_is_response_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("   ")))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "gm-test");
        assert_eq!(provider.timeout(), None);
        let err = provider
            .invoke(&ImageInput::png(&[1]), "p", "gemini-2.5-flash")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ResponseShape { .. }));
    }

    #[tokio::test]
    async fn test_invoke_blocked_prompt_is_response_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&server.uri(), "gm-test");
        let err = provider
            .invoke(&ImageInput::png(&[1]), "p", "gemini-2.5-flash")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ResponseShape { .. }));
    }
}
