//! Conversion orchestrator: one linear pipeline per request.
//!
//! Flow: load template → build prompt → encode (or extract) each document →
//!       assemble content sequence → single provider call → unwrap fence.
//!
//! Holds no per-request state; one `Converter` is shared by all requests.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::AttachmentMode;
use crate::conversion::encode::encode_attachment;
use crate::conversion::extract::extract_text;
use crate::conversion::payload::{build_content_sequence, display_name, frame_extracted_text};
use crate::conversion::postprocess::extract_latex_code;
use crate::conversion::prompts::build_prompt;
use crate::conversion::template::TemplateSource;
use crate::conversion::ConversionResult;
use crate::errors::AppError;
use crate::intake::{select_supported, UploadBatch, UploadedFile};
use crate::llm_client::prompts::LATEX_ONLY_SYSTEM;
use crate::llm_client::{ContentPart, GenerationConfig, GenerationProvider, GenerationRequest};

pub struct Converter {
    provider: Arc<dyn GenerationProvider>,
    template: TemplateSource,
    mode: AttachmentMode,
    generation: GenerationConfig,
}

impl Converter {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        template: TemplateSource,
        mode: AttachmentMode,
    ) -> Self {
        Self {
            provider,
            template,
            mode,
            generation: GenerationConfig::default(),
        }
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    /// Validates a raw upload batch, then converts the accepted files.
    /// Validation failures return before the provider is touched.
    pub async fn convert_upload(&self, batch: UploadBatch) -> Result<ConversionResult, AppError> {
        let files = select_supported(batch)?;
        self.convert(files).await
    }

    /// Converts an already-validated batch. Every failure is reported as
    /// `ConversionFailed` with its cause attached.
    pub async fn convert(&self, files: Vec<UploadedFile>) -> Result<ConversionResult, AppError> {
        self.run(files).await.map_err(AppError::ConversionFailed)
    }

    async fn run(&self, files: Vec<UploadedFile>) -> Result<ConversionResult> {
        let prompt = build_prompt(self.template.load());
        let request = self.build_request(prompt, &files).await?;

        info!(
            "Calling {} with {} part(s) ({} attachment(s)) for {} file(s)",
            self.provider.name(),
            request.parts.len(),
            request.parts.iter().filter(|p| p.is_attachment()).count(),
            files.len()
        );
        let started = Instant::now();
        let output = self
            .provider
            .generate(&request)
            .await
            .with_context(|| format!("{} request failed", self.provider.name()))?;
        info!(
            "{} responded in {}ms (input_tokens={:?}, output_tokens={:?})",
            self.provider.name(),
            started.elapsed().as_millis(),
            output.input_tokens,
            output.output_tokens
        );

        let text = output
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(AppError::EmptyModelResponse)?;

        let latex_source = extract_latex_code(&text);
        info!("LaTeX extracted: {} chars", latex_source.len());

        Ok(ConversionResult { latex_source })
    }

    /// Assembles `[prompt, documents…, manifest?]` in the configured representation.
    pub async fn build_request(
        &self,
        prompt: String,
        files: &[UploadedFile],
    ) -> Result<GenerationRequest> {
        let mut documents = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            let part = match self.mode {
                AttachmentMode::Inline => {
                    let attachment = encode_attachment(file);
                    debug!(
                        "Attached '{}' as {}",
                        attachment.source_name, attachment.media_type
                    );
                    ContentPart::Attachment(attachment)
                }
                AttachmentMode::ExtractedText => {
                    let name = display_name(&file.name, index, self.mode);
                    let kind = file.kind;
                    let bytes = file.bytes.clone();
                    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
                        .await
                        .context("text extraction task failed")?
                        .with_context(|| format!("failed to extract text from '{name}'"))?;
                    debug!("Extracted {} chars from '{name}'", text.len());
                    frame_extracted_text(&name, &text)
                }
            };
            documents.push(part);
        }

        let known_names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        Ok(GenerationRequest {
            system: Some(LATEX_ONLY_SYSTEM.to_string()),
            parts: build_content_sequence(prompt, documents, &known_names, self.mode),
            config: self.generation,
        })
    }
}
