//! Server error types.

use attendance::AttendanceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use document_store::DocumentStoreError;
use rpc_protocol::{error_codes, ApiError};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with stored data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Document store error.
    #[error("Storage error: {0}")]
    Storage(#[from] DocumentStoreError),
}

impl From<AttendanceError> for ServerError {
    fn from(e: AttendanceError) -> Self {
        match e {
            AttendanceError::Storage(e) => Self::Storage(e),
            AttendanceError::CourseNotFound(id) => Self::NotFound(format!("Course {}", id)),
            AttendanceError::StudentNotFound(id) => Self::NotFound(format!("Student {}", id)),
            AttendanceError::StudentAlreadyExists(id) => {
                Self::Conflict(format!("Student {} already exists", id))
            }
            e @ (AttendanceError::InvalidTimeZone(_) | AttendanceError::InvalidInput(_)) => {
                Self::InvalidRequest(e.to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::invalid_request(msg))
            }
            ServerError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, ApiError::not_found(&resource))
            }
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::conflict(msg)),
            ServerError::Storage(DocumentStoreError::NotFound { collection, id }) => (
                StatusCode::NOT_FOUND,
                ApiError::not_found(&format!("{}/{}", collection, id)),
            ),
            ServerError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new(error_codes::STORAGE_ERROR, e.to_string()),
                )
            }
        };

        (status, Json(error.into_response_body())).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
