// All prompt text for resume → LaTeX conversion.
// The prompt is identical for every call apart from the embedded template.

/// Conversion prompt. Replace `{template}` before sending.
pub const CONVERSION_PROMPT_TEMPLATE: &str = r#"
You are a professional resume formatter that converts various resume formats into clean, professional LaTeX code.

GOAL: Make a clean and professional resume using the target documents, pushing that data into the LaTeX template.

INSTRUCTIONS:
1. Analyze the provided resume document carefully.
2. Extract all relevant information including:
   - Contact details (name, email, phone, location, website, LinkedIn, GitHub)
   - Education history
   - Work experience
   - Skills
   - Projects
   - Certifications
   - Awards
   - Any other relevant sections
3. Use the provided LaTeX template below and fill it with the extracted information.
4. Ensure the formatting is clean, professional, and ATS-friendly.
5. Maintain the original content but improve organization and presentation.
6. Return ONLY the complete LaTeX code without any explanations or comments outside the code.
7. Keep the length to that which would make a single page PDF.

IMPORTANT:
- Use the provided template structure and commands.
- Do not change the LaTeX preamble or package imports.
- Ensure the document is complete and ready to compile.
- Optimize spacing and layout for a one-page resume when possible.
- Do not add any information that is not in the original resume.
- Do not use the provided documents for formatting at all; only use them as information.
- Only use the provided LaTeX template as a reference for the structure and commands.
- Do not keep any template information in the final resume. The template supplies formatting, the documents supply content.


TEMPLATE TO USE:
```latex
{template}
```
"#;

/// Closing note after binary attachments. Replace `{file_list}`.
pub const ATTACHED_FILES_NOTE: &str = "\nNote: The following documents have been provided:\n{file_list}\n\n\
    Please analyze the complete documents (including formatting and layout) together \
    and create a single comprehensive, professional LaTeX resume.";

/// Closing note after extracted-text parts. Replace `{file_list}`.
pub const EXTRACTED_FILES_NOTE: &str = "\nNote: The above content was extracted from:\n{file_list}\n\n\
    Please use all of this information together to create a single comprehensive, \
    professional LaTeX resume.";

/// Frame around one document's extracted text. Replace `{file_name}` and `{text}`.
pub const EXTRACTED_TEXT_FRAME: &str =
    "\n--- Resume Content from {file_name} ---\n{text}\n--- End of Resume Content ---\n";

/// Builds the conversion prompt around the given template text.
pub fn build_prompt(template: &str) -> String {
    CONVERSION_PROMPT_TEMPLATE.replace("{template}", template)
}
