//! Attendance error types.

use document_store::DocumentStoreError;
use thiserror::Error;

/// Errors that can occur during attendance operations.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DocumentStoreError),

    /// Course not found.
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    /// Student not found.
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// A student with this ID already exists.
    #[error("Student already exists: {0}")]
    StudentAlreadyExists(String),

    /// Unknown IANA time zone name.
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AttendanceError {
    /// Creates an invalid input error for a blank required field.
    pub fn required(field: &str) -> Self {
        Self::InvalidInput(format!("{} must not be empty", field))
    }
}

/// Result type for attendance operations.
pub type AttendanceResult<T> = Result<T, AttendanceError>;
