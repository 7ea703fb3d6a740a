//! OpenRouter back-end (OpenAI-compatible chat completions). Attachments are
//! sent as `image_url` parts carrying a base64 data URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    api_error, send_error, ContentPart, GenerationOutput, GenerationProvider, GenerationRequest,
    ProviderError,
};

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const MODEL: &str = "google/gemini-2.5-pro";
const APP_TITLE: &str = "LaTeX Resume Converter";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Plain(&'a str),
    Parts(Vec<ChatPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
}

impl ChatResponse {
    fn text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.is_empty())
    }
}

pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    site_url: String,
    timeout: Duration,
}

impl OpenRouterProvider {
    pub fn new(client: Client, api_key: String, site_url: String, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            site_url,
            timeout,
        }
    }
}

fn build_request(request: &GenerationRequest) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: MessageContent::Plain(system),
        });
    }

    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => ChatPart::Text { text },
            ContentPart::Attachment(a) => ChatPart::ImageUrl {
                image_url: ImageUrl { url: a.data_url() },
            },
        })
        .collect();

    messages.push(ChatMessage {
        role: "user",
        content: MessageContent::Parts(parts),
    });

    ChatRequest {
        model: MODEL,
        messages,
        temperature: request.config.temperature,
        top_p: request.config.top_p,
        max_tokens: request.config.max_output_tokens,
    }
}

#[async_trait]
impl GenerationProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, ProviderError> {
        let body = build_request(request);

        let response = self
            .client
            .post(format!("{OPENROUTER_API_BASE}/chat/completions"))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response.bytes().await.map_err(|e| send_error(e, self.timeout))?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)?;
        let input_tokens = parsed.usage.as_ref().and_then(|u| u.prompt_tokens);
        let output_tokens = parsed.usage.as_ref().and_then(|u| u.completion_tokens);

        debug!(
            "OpenRouter call succeeded: input_tokens={:?}, output_tokens={:?}",
            input_tokens, output_tokens
        );

        Ok(GenerationOutput {
            text: parsed.text(),
            input_tokens,
            output_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{EncodedAttachment, GenerationConfig};
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest {
            system: Some("LaTeX only.".to_string()),
            parts: vec![
                ContentPart::Text("Convert.".to_string()),
                ContentPart::Attachment(EncodedAttachment {
                    base64_data: "UEsDBA==".to_string(),
                    media_type:
                        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                            .to_string(),
                    source_name: "cv.docx".to_string(),
                }),
            ],
            config: GenerationConfig::default(),
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();

        assert_eq!(body["model"], MODEL);
        assert_eq!(body["max_tokens"], 8192);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(
            body["messages"][0],
            json!({"role": "system", "content": "LaTeX only."})
        );
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(
            body["messages"][1]["content"][0],
            json!({"type": "text", "text": "Convert."})
        );
        assert_eq!(
            body["messages"][1]["content"][1]["type"],
            "image_url"
        );
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:application/vnd.openxmlformats-officedocument.wordprocessingml.document;base64,UEsDBA=="
        );
    }

    #[test]
    fn test_request_without_system_has_single_message() {
        let request = GenerationRequest {
            system: None,
            parts: vec![ContentPart::Text("hello".to_string())],
            config: GenerationConfig::default(),
        };
        let body = serde_json::to_value(build_request(&request)).unwrap();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_text_from_first_choice() {
        let raw = json!({
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "```latex\nx\n```"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("```latex\nx\n```"));
    }

    #[test]
    fn test_null_or_empty_content_is_no_text() {
        let null_content: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert!(null_content.text().is_none());

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.text().is_none());
    }
}
