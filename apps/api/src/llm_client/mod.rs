/// LLM Client: the single point of entry for generation-provider calls.
///
/// No other module talks to a provider API directly. Callers build an ordered
/// content sequence, hand it to an `Arc<dyn GenerationProvider>`, and get text
/// back. The concrete back-end is chosen once at startup from `Config`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{Config, ProviderKind};

pub mod gemini;
pub mod openrouter;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Sampling parameters sent with every conversion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 1.0,
            max_output_tokens: 8192,
        }
    }
}

/// A document's bytes in base64 (standard alphabet, no wrapping) with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAttachment {
    pub base64_data: String,
    pub media_type: String,
    pub source_name: String,
}

impl EncodedAttachment {
    /// `data:<mime>;base64,<payload>` form used by OpenAI-compatible APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64_data)
    }
}

/// One element of the ordered content sequence sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Attachment(EncodedAttachment),
}

impl ContentPart {
    pub fn is_attachment(&self) -> bool {
        matches!(self, ContentPart::Attachment(_))
    }
}

/// A single, complete generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System/developer instruction. Providers without a system slot may ignore it.
    pub system: Option<String>,
    pub parts: Vec<ContentPart>,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// `None` when the provider returned no text at all.
    pub text: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// A generation back-end: takes an ordered content sequence plus fixed
/// parameters and returns the model's text. One call, no streaming.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationOutput, ProviderError>;
}

/// Builds the configured provider. The HTTP client carries an explicit
/// deadline so a hung provider cannot hold a request open forever.
pub fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn GenerationProvider>> {
    let http = http_client(config.llm_timeout)?;
    let provider: Arc<dyn GenerationProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            http,
            config.api_key.clone(),
            config.llm_timeout,
        )),
        ProviderKind::OpenRouter => Arc::new(OpenRouterProvider::new(
            http,
            config.api_key.clone(),
            config.site_url.clone(),
            config.llm_timeout,
        )),
    };
    Ok(provider)
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Shape shared by Gemini and OpenAI-compatible error bodies: `{"error": {"message": …}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-2xx response into `ProviderError::Api`, preferring the
/// provider's own message over the raw body.
async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderError::Api {
        status,
        message: parse_error_message(&body),
    }
}

fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Maps reqwest timeouts onto `ProviderError::Timeout`.
fn send_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            secs: timeout.as_secs(),
        }
    } else {
        ProviderError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generation_config() {
        let config = GenerationConfig::default();
        assert!((config.temperature - 0.4).abs() < f32::EPSILON);
        assert!((config.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.max_output_tokens, 8192);
    }

    #[test]
    fn test_data_url_format() {
        let attachment = EncodedAttachment {
            base64_data: "JVBERi0=".to_string(),
            media_type: "application/pdf".to_string(),
            source_name: "resume.pdf".to_string(),
        };
        assert_eq!(attachment.data_url(), "data:application/pdf;base64,JVBERi0=");
    }

    #[test]
    fn test_parse_error_message_prefers_provider_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(parse_error_message(body), "API key not valid");
    }

    #[test]
    fn test_parse_error_message_falls_back_to_raw_body() {
        assert_eq!(parse_error_message("Bad Gateway"), "Bad Gateway");
    }
}
