//! Attachment encoding: raw document bytes → standard base64 (no line wrapping).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::intake::UploadedFile;
use crate::llm_client::EncodedAttachment;

/// Encodes one accepted upload for transmission to the provider.
pub fn encode_attachment(file: &UploadedFile) -> EncodedAttachment {
    let base64_data = STANDARD.encode(&file.bytes);
    debug!(
        "Encoded '{}' → {} bytes base64",
        file.name,
        base64_data.len()
    );

    EncodedAttachment {
        base64_data,
        media_type: file.media_type().to_string(),
        source_name: file.name.clone(),
    }
}
