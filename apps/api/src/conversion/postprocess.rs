//! Response unwrapping: models sometimes wrap the LaTeX in a markdown fence
//! even when told not to.

use once_cell::sync::Lazy;
use regex::Regex;

/// First fenced block, optionally labelled `latex`/`tex`. Non-greedy, so a
/// stray second fence later in the reply is left alone.
static RE_FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:(?i:latex|tex)\b)?\s*(.*?)```").unwrap());

/// Returns the inner content of the first fenced block, trimmed, or the whole
/// trimmed reply when no (non-empty) fenced block is present.
pub fn extract_latex_code(text: &str) -> String {
    if let Some(inner) = RE_FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|inner| !inner.is_empty())
    {
        return inner.to_string();
    }
    text.trim().to_string()
}
