//! API error envelope

use serde::{Deserialize, Serialize};

/// Machine-readable error codes.
pub mod error_codes {
    /// The request body or one of its fields is invalid
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// The course, student or entry does not exist
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    /// The request conflicts with stored data
    pub const CONFLICT: &str = "CONFLICT";
    /// The document store failed
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// One of [`error_codes`]
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Body of every failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

impl ApiError {
    /// Creates a new error
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Creates an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    /// Creates a not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            error_codes::RESOURCE_NOT_FOUND,
            format!("{} not found", resource),
        )
    }

    /// Creates a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(error_codes::CONFLICT, message)
    }

    /// Wraps the error in the response envelope
    pub fn into_response_body(self) -> ErrorResponse {
        ErrorResponse { error: self }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
