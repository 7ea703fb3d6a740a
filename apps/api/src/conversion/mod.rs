//! Resume → LaTeX conversion.
//!
//! 1. [`template`]: load the static LaTeX template (empty on failure)
//! 2. [`prompts`]: embed it in the fixed formatting prompt
//! 3. [`encode`] / [`extract`]: represent each document as base64 bytes or
//!    as locally extracted text, per `ATTACHMENT_MODE`
//! 4. [`payload`]: order the parts and append the file manifest
//! 5. [`converter`]: one provider call through `llm_client`
//! 6. [`postprocess`]: strip a markdown fence from the reply

pub mod converter;
pub mod encode;
pub mod extract;
pub mod handlers;
pub mod payload;
pub mod postprocess;
pub mod prompts;
pub mod template;

use serde::Serialize;

pub use converter::Converter;

/// The unwrapped model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    #[serde(rename = "latexCode")]
    pub latex_source: String,
}
