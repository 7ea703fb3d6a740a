// Cross-cutting prompt fragments shared by every provider back-end.
// Conversion-specific prompt text lives in conversion/prompts.rs.

/// System instruction sent alongside every conversion request.
pub const LATEX_ONLY_SYSTEM: &str = "You are a professional resume formatter. \
    You MUST respond with a complete LaTeX document only. \
    Do NOT include any text before \\documentclass or after \\end{document}. \
    Do NOT include explanations or apologies.";
