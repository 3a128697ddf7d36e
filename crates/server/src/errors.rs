use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sparky::SparkyError;
use sparky_pdf::IngestError;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// Errors originating from the `sparky` library.
    Sparky(SparkyError),
    /// Errors from reading the book library.
    Library(IngestError),
    /// The request was well-formed JSON but semantically invalid.
    BadRequest(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<SparkyError> for AppError {
    fn from(err: SparkyError) -> Self {
        AppError::Sparky(err)
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::Library(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Sparky(err) => {
                error!("SparkyError: {:?}", err);
                match err {
                    SparkyError::InvalidHistory(msg) => (
                        StatusCode::BAD_REQUEST,
                        format!("Invalid conversation history: {msg}"),
                    ),
                    SparkyError::NotConfigured(msg) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        format!("Service is not configured: {msg}"),
                    ),
                    SparkyError::AiRequest(_)
                    | SparkyError::AiDeserialization(_)
                    | SparkyError::AiApi(_) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Completion provider error: {err}"),
                    ),
                    SparkyError::EmbeddingRequest(_)
                    | SparkyError::EmbeddingApi(_)
                    | SparkyError::EmbeddingDimension { .. } => (
                        StatusCode::BAD_GATEWAY,
                        format!("Embedding provider error: {err}"),
                    ),
                    SparkyError::VectorIndexRequest(_)
                    | SparkyError::VectorIndexDeserialization(_)
                    | SparkyError::VectorIndexApi(_) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Vector index error: {err}"),
                    ),
                    other => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Internal error: {other}"),
                    ),
                }
            }
            AppError::Library(err) => {
                error!("Book library error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read the book library: {err}"),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
