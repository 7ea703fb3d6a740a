use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Default request body ceiling for uploads (25 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Which generation back-end handles conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenRouter,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => bail!("LLM_PROVIDER must be 'gemini' or 'openrouter', got '{other}'"),
        }
    }
}

/// How uploaded documents are represented in the model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentMode {
    /// Raw file bytes, base64-encoded, sent as binary attachments.
    Inline,
    /// Plain text extracted locally from each document, sent as text parts.
    ExtractedText,
}

impl FromStr for AttachmentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(AttachmentMode::Inline),
            "extracted-text" | "extracted_text" | "text" => Ok(AttachmentMode::ExtractedText),
            other => {
                bail!("ATTACHMENT_MODE must be 'inline' or 'extracted-text', got '{other}'")
            }
        }
    }
}

/// What to do when one uploaded file's bytes cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileReadPolicy {
    /// Fail the whole request with `FileReadError`.
    Abort,
    /// Log the failure and continue with the remaining files.
    Skip,
}

impl FromStr for FileReadPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FileReadPolicy::Abort),
            "skip" => Ok(FileReadPolicy::Skip),
            other => bail!("FILE_READ_POLICY must be 'abort' or 'skip', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if the selected provider's API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// `true` unless `APP_ENV=development`; controls stack traces in error bodies.
    pub production: bool,
    pub provider: ProviderKind,
    pub api_key: String,
    pub site_url: String,
    pub template_path: PathBuf,
    pub attachment_mode: AttachmentMode,
    pub file_read_policy: FileReadPolicy,
    pub llm_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider: ProviderKind = optional_env("LLM_PROVIDER", "gemini").parse()?;
        let api_key = match provider {
            ProviderKind::Gemini => require_env("GEMINI_API_KEY")?,
            ProviderKind::OpenRouter => require_env("OPENROUTER_API_KEY")?,
        };

        Ok(Config {
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            production: !optional_env("APP_ENV", "production").eq_ignore_ascii_case("development"),
            provider,
            api_key,
            site_url: optional_env("SITE_URL", "http://localhost:3000"),
            template_path: PathBuf::from(optional_env(
                "TEMPLATE_PATH",
                "templates/resume-template.tex",
            )),
            attachment_mode: optional_env("ATTACHMENT_MODE", "inline").parse()?,
            file_read_policy: optional_env("FILE_READ_POLICY", "abort").parse()?,
            llm_timeout: Duration::from_secs(
                optional_env("LLM_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parses_case_insensitively() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(
            " openrouter ".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenRouter
        );
        assert!("anthropic".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_attachment_mode_accepts_aliases() {
        assert_eq!("inline".parse::<AttachmentMode>().unwrap(), AttachmentMode::Inline);
        assert_eq!(
            "extracted-text".parse::<AttachmentMode>().unwrap(),
            AttachmentMode::ExtractedText
        );
        assert_eq!(
            "extracted_text".parse::<AttachmentMode>().unwrap(),
            AttachmentMode::ExtractedText
        );
        assert!("pixels".parse::<AttachmentMode>().is_err());
    }

    #[test]
    fn test_file_read_policy_rejects_unknown_values() {
        assert_eq!("skip".parse::<FileReadPolicy>().unwrap(), FileReadPolicy::Skip);
        assert_eq!("ABORT".parse::<FileReadPolicy>().unwrap(), FileReadPolicy::Abort);
        let err = "retry".parse::<FileReadPolicy>().unwrap_err();
        assert!(err.to_string().contains("FILE_READ_POLICY"));
    }
}
