use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

/// The LaTeX template embedded in every prompt.
///
/// Read lazily and cached after the first successful read. An unreadable
/// template yields an empty string and is retried on the next call.
pub struct TemplateSource {
    path: PathBuf,
    cached: OnceCell<String>,
}

impl TemplateSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new(),
        }
    }

    /// A template that never touches the filesystem.
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            cached: OnceCell::with_value(text.into()),
        }
    }

    pub fn load(&self) -> &str {
        match self
            .cached
            .get_or_try_init(|| std::fs::read_to_string(&self.path))
        {
            Ok(template) => template,
            Err(e) => {
                warn!(
                    "Could not read LaTeX template at {}: {e}; continuing without it",
                    self.path.display()
                );
                ""
            }
        }
    }

    /// Eagerly reads the template so a bad path shows up in the startup log.
    pub fn preload(&self) {
        let template = self.load();
        if !template.is_empty() {
            info!(
                "LaTeX template loaded from {} ({} chars)",
                self.path.display(),
                template.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_template_degrades_to_empty() {
        let source = TemplateSource::from_path("/nonexistent/resume-template.tex");
        assert_eq!(source.load(), "");
        // Still empty (and still not cached) on the next call.
        assert_eq!(source.load(), "");
    }

    #[test]
    fn test_bundled_template_is_readable() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/resume-template.tex");
        let source = TemplateSource::from_path(path);
        let template = source.load();
        assert!(template.contains("\\documentclass"));
        assert!(template.contains("\\end{document}"));
    }

    #[test]
    fn test_from_text_skips_filesystem() {
        let source = TemplateSource::from_text("\\documentclass{article}");
        assert_eq!(source.load(), "\\documentclass{article}");
    }
}
