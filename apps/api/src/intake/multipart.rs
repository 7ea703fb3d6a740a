use axum::extract::Multipart;
use bytes::Bytes;
use tracing::{debug, warn};

use super::{RawUpload, UploadBatch};
use crate::config::FileReadPolicy;
use crate::errors::AppError;

/// Multipart field that carries resume uploads.
pub const FILES_FIELD: &str = "files";

/// Reads every `files` part from the multipart body.
///
/// Parts under other field names are ignored. Parts without a filename are
/// counted as submitted but carry no document. Read failures follow `policy`;
/// under `Skip` the stream cannot be resumed past a failed part, so reading
/// stops there and the files read so far are kept.
pub async fn read_uploads(
    mut multipart: Multipart,
    policy: FileReadPolicy,
) -> Result<UploadBatch, AppError> {
    let mut batch = UploadBatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidForm(e.to_string()))?
    {
        if field.name() != Some(FILES_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            warn!("Part under '{FILES_FIELD}' is not a file; skipping");
            batch.submitted += 1;
            continue;
        };
        let declared_type = field.content_type().map(str::to_string);

        let bytes = field.bytes().await;
        if !record_part(&mut batch, file_name, declared_type, bytes, policy)? {
            warn!("Multipart stream unreadable after a failed part; keeping files read so far");
            break;
        }
    }

    debug!(
        "Multipart read complete: {} submitted, {} readable",
        batch.submitted,
        batch.files.len()
    );
    Ok(batch)
}

/// Adds one file part to the batch, applying the read-failure policy.
/// Returns `false` when the part was skipped after a read failure.
fn record_part<E>(
    batch: &mut UploadBatch,
    file_name: String,
    declared_type: Option<String>,
    bytes: Result<Bytes, E>,
    policy: FileReadPolicy,
) -> Result<bool, AppError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    batch.submitted += 1;
    match bytes {
        Ok(bytes) => {
            batch.files.push(RawUpload {
                file_name,
                declared_type,
                bytes,
            });
            Ok(true)
        }
        Err(e) => match policy {
            FileReadPolicy::Abort => Err(AppError::FileRead {
                file_name,
                source: e.into(),
            }),
            FileReadPolicy::Skip => {
                warn!("Failed to read '{file_name}', skipping: {e}");
                Ok(false)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_failure() -> Result<Bytes, std::io::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream closed",
        ))
    }

    #[test]
    fn test_record_part_keeps_readable_file() {
        let mut batch = UploadBatch::default();
        let ok: Result<Bytes, std::io::Error> = Ok(Bytes::from_static(b"data"));
        let kept = record_part(
            &mut batch,
            "a.pdf".to_string(),
            Some("application/pdf".to_string()),
            ok,
            FileReadPolicy::Abort,
        )
        .unwrap();

        assert!(kept);
        assert_eq!(batch.submitted, 1);
        assert_eq!(batch.files.len(), 1);
        assert_eq!(batch.files[0].file_name, "a.pdf");
        assert_eq!(batch.files[0].bytes.as_ref(), b"data");
    }

    #[test]
    fn test_abort_policy_fails_with_file_read_error() {
        let mut batch = UploadBatch::default();
        let err = record_part(
            &mut batch,
            "broken.pdf".to_string(),
            None,
            read_failure(),
            FileReadPolicy::Abort,
        )
        .unwrap_err();

        match err {
            AppError::FileRead { file_name, source } => {
                assert_eq!(file_name, "broken.pdf");
                assert!(source.to_string().contains("stream closed"));
            }
            other => panic!("expected FileRead, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_policy_counts_but_drops_file() {
        let mut batch = UploadBatch::default();
        let kept = record_part(
            &mut batch,
            "broken.pdf".to_string(),
            None,
            read_failure(),
            FileReadPolicy::Skip,
        )
        .unwrap();

        assert!(!kept);
        assert_eq!(batch.submitted, 1);
        assert!(batch.files.is_empty());
    }
}
