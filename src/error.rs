use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Error processing image: {0}")]
    ProcessingError(String),

    #[error("Failed to load test catalog: {0}")]
    CatalogError(String),

    #[error("No file uploaded")]
    MissingFile,

    #[error("Uploaded file is not an image")]
    NotAnImage,

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Upload exceeds the {max} byte limit")]
    UploadTooLarge { max: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown OCR engine: {0}")]
    UnknownEngine(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LabError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LabError::InitializationError(_)
            | LabError::ProcessingError(_)
            | LabError::CatalogError(_)
            | LabError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LabError::MissingFile | LabError::NotAnImage | LabError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            LabError::ImageTooLarge { .. } | LabError::UploadTooLarge { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            LabError::UnknownEngine(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Failure envelope, same shape as a successful lab test response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub is_success: bool,
    pub message: String,
    pub data: Vec<serde_json::Value>,
}

impl IntoResponse for LabError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            is_success: false,
            message: self.to_string(),
            data: Vec::new(),
        });

        (status, body).into_response()
    }
}
