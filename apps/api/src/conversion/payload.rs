//! Content-sequence assembly: `[prompt, document_1 … document_n, manifest?]`.

use crate::config::AttachmentMode;
use crate::conversion::prompts::{
    ATTACHED_FILES_NOTE, EXTRACTED_FILES_NOTE, EXTRACTED_TEXT_FRAME,
};
use crate::llm_client::ContentPart;

/// Name shown for a document whose upload carried an empty filename.
pub fn display_name(name: &str, index: usize, mode: AttachmentMode) -> String {
    if !name.trim().is_empty() {
        return name.to_string();
    }
    match mode {
        AttachmentMode::Inline => format!("File {}", index + 1),
        AttachmentMode::ExtractedText => format!("Document {}", index + 1),
    }
}

/// Wraps one document's extracted text in its start/end markers.
pub fn frame_extracted_text(file_name: &str, text: &str) -> ContentPart {
    ContentPart::Text(
        EXTRACTED_TEXT_FRAME
            .replace("{file_name}", file_name)
            .replace("{text}", text),
    )
}

/// Human-readable listing of the original file names, or `None` when no
/// name is known.
pub fn manifest_note(file_names: &[String], mode: AttachmentMode) -> Option<String> {
    let known: Vec<&str> = file_names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if known.is_empty() {
        return None;
    }

    let file_list = known
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    let note = match mode {
        AttachmentMode::Inline => ATTACHED_FILES_NOTE,
        AttachmentMode::ExtractedText => EXTRACTED_FILES_NOTE,
    };
    Some(note.replace("{file_list}", &file_list))
}

/// Builds the ordered content sequence for one conversion request.
pub fn build_content_sequence(
    prompt: String,
    documents: Vec<ContentPart>,
    file_names: &[String],
    mode: AttachmentMode,
) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(documents.len() + 2);
    parts.push(ContentPart::Text(prompt));
    parts.extend(documents);
    if let Some(note) = manifest_note(file_names, mode) {
        parts.push(ContentPart::Text(note));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::EncodedAttachment;

    fn attachment(name: &str, media_type: &str) -> ContentPart {
        ContentPart::Attachment(EncodedAttachment {
            base64_data: "AAAA".to_string(),
            media_type: media_type.to_string(),
            source_name: name.to_string(),
        })
    }

    #[test]
    fn test_two_files_yield_prompt_attachments_then_manifest() {
        let names = vec!["resume.pdf".to_string(), "resume.docx".to_string()];
        let parts = build_content_sequence(
            "PROMPT".to_string(),
            vec![
                attachment("resume.pdf", "application/pdf"),
                attachment("resume.docx", "application/docx"),
            ],
            &names,
            AttachmentMode::Inline,
        );

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], ContentPart::Text("PROMPT".to_string()));
        assert!(parts[1].is_attachment());
        assert!(parts[2].is_attachment());
        assert_eq!(parts.iter().filter(|p| p.is_attachment()).count(), 2);

        let ContentPart::Text(note) = &parts[3] else {
            panic!("manifest must be a text part");
        };
        assert!(note.contains("- resume.pdf\n- resume.docx"));
        assert!(note.contains("together"));
    }

    #[test]
    fn test_manifest_omitted_without_known_names() {
        let parts = build_content_sequence(
            "PROMPT".to_string(),
            vec![attachment("", "application/pdf")],
            &["  ".to_string()],
            AttachmentMode::Inline,
        );
        assert_eq!(parts.len(), 2);
        assert!(manifest_note(&[], AttachmentMode::Inline).is_none());
    }

    #[test]
    fn test_extracted_mode_uses_extraction_wording() {
        let note = manifest_note(&["cv.docx".to_string()], AttachmentMode::ExtractedText).unwrap();
        assert!(note.starts_with("\nNote: The above content was extracted from:\n- cv.docx"));
    }

    #[test]
    fn test_frame_extracted_text() {
        let ContentPart::Text(framed) = frame_extracted_text("cv.docx", "Jane Doe") else {
            panic!("expected text part");
        };
        assert_eq!(
            framed,
            "\n--- Resume Content from cv.docx ---\nJane Doe\n--- End of Resume Content ---\n"
        );
    }

    #[test]
    fn test_display_name_placeholders() {
        assert_eq!(display_name("cv.pdf", 0, AttachmentMode::Inline), "cv.pdf");
        assert_eq!(display_name("", 1, AttachmentMode::Inline), "File 2");
        assert_eq!(display_name(" ", 0, AttachmentMode::ExtractedText), "Document 1");
    }
}
