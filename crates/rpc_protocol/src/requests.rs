//! API request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Course Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub group_name: String,
    pub school_year: String,
    #[serde(default)]
    pub teacher_id: Option<String>,
    /// IANA zone overriding the server default for this course
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCoursesRequest {
    #[serde(default)]
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCourseRequest {
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub course_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub school_year: Option<String>,
    /// An empty string clears the override
    #[serde(default)]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCourseRequest {
    pub course_id: String,
}

// ============================================================================
// Student Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddStudentRequest {
    pub course_id: String,
    pub student_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStudentsRequest {
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveStudentRequest {
    pub student_id: String,
}

// ============================================================================
// Attendance Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub course_id: String,
    /// Decoded QR payload, as read by the scanner
    pub raw_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeSessionRequest {
    pub course_id: String,
    /// Defaults to today in the course's time zone
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistoryRequest {
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayDetailRequest {
    pub course_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectDatesRequest {
    pub course_id: String,
}

// ============================================================================
// Report Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReportRequest {
    pub course_id: String,
    /// `YYYY-MM`
    pub year_month: String,
}
