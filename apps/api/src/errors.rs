use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Validation failures (`InvalidForm`, `EmptyUpload`, `NoValidFiles`) are
/// detected before any provider call and map to 400. Everything else is a 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error parsing form data: {0}")]
    InvalidForm(String),

    #[error("No files uploaded")]
    EmptyUpload,

    #[error("No valid files found")]
    NoValidFiles,

    #[error("Failed to read '{file_name}': {source}")]
    FileRead {
        file_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No response from model")]
    EmptyModelResponse,

    #[error("Failed to convert resume to LaTeX: {0:#}")]
    ConversionFailed(anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidForm(_) | AppError::EmptyUpload | AppError::NoValidFiles => {
                StatusCode::BAD_REQUEST
            }
            AppError::FileRead { .. }
            | AppError::EmptyModelResponse
            | AppError::ConversionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidForm(_) => "INVALID_FORM",
            AppError::EmptyUpload => "EMPTY_UPLOAD",
            AppError::NoValidFiles => "NO_VALID_FILES",
            AppError::FileRead { .. } => "FILE_READ_ERROR",
            AppError::EmptyModelResponse => "EMPTY_MODEL_RESPONSE",
            AppError::ConversionFailed(_) => "CONVERSION_FAILED",
        }
    }

    /// Attaches a debug trace to the response body. Only used outside production.
    pub fn with_trace(self) -> ErrorReport {
        ErrorReport {
            error: self,
            include_trace: true,
        }
    }

    fn body(&self, include_trace: bool) -> ErrorBody {
        let (message, details) = match self {
            AppError::InvalidForm(detail) => {
                ("Error parsing form data".to_string(), Some(detail.clone()))
            }
            AppError::EmptyUpload => ("No files uploaded.".to_string(), None),
            AppError::NoValidFiles => ("No valid files found.".to_string(), None),
            AppError::FileRead { file_name, source } => (
                format!("Failed to process {file_name}"),
                Some(format!("{source:#}")),
            ),
            AppError::EmptyModelResponse => ("No response from model".to_string(), None),
            AppError::ConversionFailed(cause) => (
                "Failed to convert resume to LaTeX".to_string(),
                Some(format!("{cause:#}")),
            ),
        };

        let stack = match self {
            AppError::FileRead { source, .. } if include_trace => Some(format!("{source:?}")),
            AppError::ConversionFailed(cause) if include_trace => Some(format!("{cause:?}")),
            _ => None,
        };

        ErrorBody {
            error: message,
            code: self.code(),
            details,
            stack,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// An `AppError` plus the decision whether to expose its trace.
/// Handlers pick this based on `Config::production`.
#[derive(Debug)]
pub struct ErrorReport {
    pub error: AppError,
    pub include_trace: bool,
}

impl From<AppError> for ErrorReport {
    fn from(error: AppError) -> Self {
        ErrorReport {
            error,
            include_trace: false,
        }
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!("{}: {:#}", self.error.code(), self.error);
        } else {
            tracing::warn!("Rejected request: {}", self.error);
        }

        (status, Json(self.error.body(self.include_trace))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ErrorReport::from(self).into_response()
    }
}
