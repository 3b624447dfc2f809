//! API response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

// ============================================================================
// Course Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub course: Course,
}

pub type CreateCourseResponse = CourseResponse;
pub type GetCourseResponse = CourseResponse;
pub type UpdateCourseResponse = CourseResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCoursesResponse {
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCourseResponse {
    pub students_removed: usize,
    pub entries_removed: usize,
    pub failed: usize,
}

// ============================================================================
// Student Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddStudentResponse {
    pub student: Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStudentsResponse {
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveStudentResponse {
    pub entries_removed: usize,
    pub failed: usize,
}

// ============================================================================
// Attendance Responses
// ============================================================================

pub type ScanResponse = ScanResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeSessionResponse {
    pub course_id: String,
    pub date: NaiveDate,
    pub absences_created: usize,
    pub already_decided: usize,
    pub failed: Vec<FailedAbsence>,
    /// False when some absences failed; finalizing again retries them
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistoryResponse {
    pub days: Vec<DaySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayDetailResponse {
    pub course_id: String,
    pub date: NaiveDate,
    pub present: Vec<StudentRef>,
    pub absent: Vec<StudentRef>,
    pub unrecorded: Vec<StudentRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectDatesResponse {
    pub corrected: usize,
}

// ============================================================================
// Report Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReportResponse {
    pub report: MonthlyReport,
}
