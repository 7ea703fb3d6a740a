//! Request intake. Turns a raw multi-file upload into the ordered list of
//! resume documents the converter accepts.
//!
//! Classification order for each file:
//! 1. A declared content type of PDF or DOCX wins.
//! 2. Otherwise the filename extension (case-insensitive) decides.
//! 3. A declared type never rescues a file whose extension names another
//!    document, image or media format (`notes.txt` sent as `application/pdf`
//!    is still dropped). Other extensions, such as the `.S` in
//!    `Resume Jane.S`, are treated as part of the name.
//!
//! Unsupported files are skipped, not errors. An empty result is `NoValidFiles`.

pub mod multipart;

use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two resume document formats the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Docx,
}

impl MediaKind {
    pub fn media_type(self) -> &'static str {
        match self {
            MediaKind::Pdf => PDF_MEDIA_TYPE,
            MediaKind::Docx => DOCX_MEDIA_TYPE,
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        // Ignore parameters such as `; charset=binary`.
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            Some(MediaKind::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MEDIA_TYPE) {
            Some(MediaKind::Docx)
        } else {
            None
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(MediaKind::Pdf),
            "docx" => Some(MediaKind::Docx),
            _ => None,
        }
    }
}

/// One file part exactly as it arrived in the upload.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: String,
    pub declared_type: Option<String>,
    pub bytes: Bytes,
}

/// The result of reading the multipart body: the readable files plus how many
/// file parts were submitted in total (including unreadable or non-file parts).
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub files: Vec<RawUpload>,
    pub submitted: usize,
}

/// A file accepted for conversion, tagged with its normalized media type.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub kind: MediaKind,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn media_type(&self) -> &'static str {
        self.kind.media_type()
    }
}

/// Resolves a file to PDF or DOCX, or `None` if it is not a resume document.
pub fn classify(file_name: &str, declared_type: Option<&str>) -> Option<MediaKind> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let by_extension = MediaKind::from_extension(extension);
    let by_declared = declared_type
        .filter(|t| !t.trim().is_empty())
        .and_then(MediaKind::from_media_type);

    match (by_declared, by_extension) {
        (Some(kind), _) => {
            if by_extension.is_none() && names_other_document_format(extension) {
                None
            } else {
                Some(kind)
            }
        }
        (None, Some(kind)) => Some(kind),
        (None, None) => None,
    }
}

/// True when the extension names a document, image or media format that is
/// not PDF or DOCX.
fn names_other_document_format(extension: &str) -> bool {
    if extension.is_empty() {
        return false;
    }
    mime_guess::from_ext(extension).iter().any(|mime| {
        match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("image" | "audio" | "video", _) => true,
            ("text", subtype) => matches!(
                subtype,
                "plain" | "markdown" | "x-markdown" | "html" | "csv" | "rtf" | "richtext"
            ),
            ("application", subtype) => {
                subtype == "msword"
                    || subtype == "rtf"
                    || subtype.starts_with("vnd.oasis.opendocument")
                    || subtype.starts_with("vnd.ms-")
                    || subtype.starts_with("vnd.openxmlformats-officedocument")
            }
            _ => false,
        }
    })
}

/// Filters a batch down to supported documents, preserving input order.
///
/// Fails with `EmptyUpload` when nothing was submitted and `NoValidFiles` when
/// every submitted file was dropped.
pub fn select_supported(batch: UploadBatch) -> Result<Vec<UploadedFile>, AppError> {
    if batch.submitted == 0 {
        return Err(AppError::EmptyUpload);
    }

    let accepted: Vec<UploadedFile> = batch
        .files
        .into_iter()
        .filter_map(|raw| {
            match classify(&raw.file_name, raw.declared_type.as_deref()) {
                Some(kind) => {
                    info!(
                        "Accepted '{}' as {} ({} bytes)",
                        raw.file_name,
                        kind.media_type(),
                        raw.bytes.len()
                    );
                    Some(UploadedFile {
                        name: raw.file_name,
                        kind,
                        bytes: raw.bytes,
                    })
                }
                None => {
                    warn!(
                        "Skipping unsupported file '{}' (declared type: {:?})",
                        raw.file_name, raw.declared_type
                    );
                    None
                }
            }
        })
        .collect();

    if accepted.is_empty() {
        warn!(
            "No valid files: {} submitted, 0 accepted",
            batch.submitted
        );
        return Err(AppError::NoValidFiles);
    }

    Ok(accepted)
}
