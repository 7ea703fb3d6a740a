use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::conversion::ConversionResult;
use crate::errors::{AppError, ErrorReport};
use crate::intake::multipart::read_uploads;
use crate::state::AppState;

/// POST /api/convert-to-latex
pub async fn handle_convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConversionResult>, ErrorReport> {
    let span = info_span!("convert_to_latex", request_id = %Uuid::new_v4());

    let outcome = async {
        let multipart = multipart.map_err(|e| AppError::InvalidForm(e.body_text()))?;
        let batch = read_uploads(multipart, state.config.file_read_policy).await?;
        info!("Received {} file part(s)", batch.submitted);
        state.converter.convert_upload(batch).await
    }
    .instrument(span)
    .await;

    outcome.map(Json).map_err(|e| {
        if state.config.production {
            ErrorReport::from(e)
        } else {
            e.with_trace()
        }
    })
}
