//! API type definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One cell of the monthly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "-")]
    NoRecord,
}

/// Course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub group_name: String,
    pub school_year: String,
    pub teacher_id: Option<String>,
    pub time_zone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student. The ID is the payload of the student's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
}

/// Attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// Result of a scan, tagged by `outcome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanResult {
    Success {
        entry: AttendanceEntry,
    },
    AlreadyScanned {
        student_name: String,
        entry: AttendanceEntry,
    },
    InvalidCode {
        raw_code: String,
    },
    NotInCourse {
        student_name: String,
    },
    StorageError {
        message: String,
    },
}

/// A student whose absence could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAbsence {
    pub student_id: String,
    pub student_name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub present_count: usize,
    pub absent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRef {
    pub student_id: String,
    pub name: String,
}

/// One row of the monthly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub student_id: String,
    pub student_name: String,
    pub marks: Vec<Mark>,
    pub present_count: usize,
    pub absent_count: usize,
}

/// Monthly attendance grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub course_id: String,
    pub course_name: String,
    pub group_name: String,
    pub school_year: String,
    /// `YYYY-MM`
    pub year_month: String,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<ReportRow>,
}

/// Change kind pushed to live listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Notification sent over the attendance event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceChangeNotification {
    pub course_id: String,
    pub kind: ChangeKind,
    pub entry_id: String,
    /// Decoded entry, absent when the document is not a valid entry yet.
    pub entry: Option<AttendanceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_result_is_tagged() {
        let result = ScanResult::NotInCourse {
            student_name: "Eva".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "not_in_course");
        assert_eq!(json["student_name"], "Eva");

        let parsed: ScanResult =
            serde_json::from_str(r#"{"outcome":"invalid_code","raw_code":"x"}"#).unwrap();
        assert_eq!(
            parsed,
            ScanResult::InvalidCode {
                raw_code: "x".to_string()
            }
        );
    }

    #[test]
    fn test_marks_serialize_as_letters() {
        let marks = vec![Mark::Present, Mark::Absent, Mark::NoRecord];
        assert_eq!(serde_json::to_string(&marks).unwrap(), r#"["P","A","-"]"#);
    }
}
