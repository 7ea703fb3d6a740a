//! Gemini `generateContent` back-end. Attachments travel as `inlineData` parts,
//! which the model reads natively for both PDF and DOCX.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    api_error, send_error, ContentPart, GenerationOutput, GenerationProvider, GenerationRequest,
    ProviderError,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Hardcoded so every deployment converts with the same model.
pub const MODEL: &str = "gemini-2.5-pro";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: GeminiBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(client: Client, api_key: String, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            timeout,
        }
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => GeminiPart::Text { text },
            ContentPart::Attachment(a) => GeminiPart::InlineData {
                inline_data: GeminiBlob {
                    mime_type: &a.media_type,
                    data: &a.base64_data,
                },
            },
        })
        .collect();

    GeminiRequest {
        system_instruction: request.system.as_deref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text { text }],
        }),
        contents: vec![GeminiContent {
            role: Some("user"),
            parts,
        }],
        generation_config: GeminiGenerationConfig {
            temperature: request.config.temperature,
            top_p: request.config.top_p,
            max_output_tokens: request.config.max_output_tokens,
        },
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, ProviderError> {
        let body = build_request(request);
        let url = format!("{GEMINI_API_BASE}/models/{MODEL}:generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response.bytes().await.map_err(|e| send_error(e, self.timeout))?;
        let parsed: GeminiResponse = serde_json::from_slice(&bytes)?;
        let usage = parsed.usage_metadata.as_ref();

        debug!(
            "Gemini call succeeded: input_tokens={:?}, output_tokens={:?}",
            usage.and_then(|u| u.prompt_token_count),
            usage.and_then(|u| u.candidates_token_count)
        );

        Ok(GenerationOutput {
            text: parsed.text(),
            input_tokens: usage.and_then(|u| u.prompt_token_count),
            output_tokens: usage.and_then(|u| u.candidates_token_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{EncodedAttachment, GenerationConfig};
    use serde_json::json;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            system: Some("Return LaTeX only.".to_string()),
            parts: vec![
                ContentPart::Text("Convert this resume.".to_string()),
                ContentPart::Attachment(EncodedAttachment {
                    base64_data: "JVBERi0xLjQ=".to_string(),
                    media_type: "application/pdf".to_string(),
                    source_name: "resume.pdf".to_string(),
                }),
            ],
            config: GenerationConfig::default(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = sample_request();
        let body = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "Return LaTeX only."
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Convert this resume."
        );
        assert_eq!(
            body["contents"][0]["parts"][1],
            json!({"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0xLjQ="}})
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["generationConfig"]["topP"], 1.0);
    }

    #[test]
    fn test_request_without_system_omits_instruction() {
        let mut request = sample_request();
        request.system = None;
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "\\documentclass"}, {"text": "{article}"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 900}
        });
        let parsed: GeminiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("\\documentclass{article}"));
        assert_eq!(
            parsed.usage_metadata.unwrap().candidates_token_count,
            Some(900)
        );
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let parsed: GeminiResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(parsed.text().is_none());
    }
}
