//! Attendance entry definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Status of an attendance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    /// Student checked in by scanning their code.
    Present,
    /// Student was not scanned when the session was closed.
    Absent,
}

impl AttendanceStatus {
    /// Converts the status to a string for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// One student's attendance decision for one course on one calendar day.
///
/// Entries are written once and never mutated afterwards. `student_name` is
/// copied from the roster at write time so historical views keep the name the
/// student had on that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    /// Unique identifier.
    pub id: String,
    /// Student ID.
    pub student_id: String,
    /// Student name at the time of writing.
    pub student_name: String,
    /// Course ID.
    pub course_id: String,
    /// Calendar day in the course's time zone.
    pub date: NaiveDate,
    /// Instant the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Attendance status.
    pub status: AttendanceStatus,
}

impl AttendanceEntry {
    /// Creates an entry keyed by its natural key.
    pub fn new(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        course_id: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
        status: AttendanceStatus,
    ) -> Self {
        let student_id = student_id.into();
        let course_id = course_id.into();
        Self {
            id: natural_key(&course_id, &student_id, date, status),
            student_id,
            student_name: student_name.into(),
            course_id,
            date,
            timestamp,
            status,
        }
    }

    /// Creates a present entry.
    pub fn present(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        course_id: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            student_id,
            student_name,
            course_id,
            date,
            timestamp,
            AttendanceStatus::Present,
        )
    }

    /// Creates an absent entry.
    pub fn absent(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        course_id: impl Into<String>,
        date: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            student_id,
            student_name,
            course_id,
            date,
            timestamp,
            AttendanceStatus::Absent,
        )
    }

    /// Returns true if this entry marks the student present.
    pub fn is_present(&self) -> bool {
        self.status == AttendanceStatus::Present
    }
}

/// Document key for the entry of a `(course, student, date, status)` tuple.
///
/// Writing entries under this key turns the "one present entry per student,
/// course and day" rule into a primary-key constraint of the store.
pub fn natural_key(
    course_id: &str,
    student_id: &str,
    date: NaiveDate,
    status: AttendanceStatus,
) -> String {
    format!(
        "{}_{}_{}_{}",
        course_id,
        student_id,
        date.format("%Y-%m-%d"),
        status.as_str()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(AttendanceStatus::Present.as_str(), "present");
        assert_eq!(
            AttendanceStatus::parse("absent"),
            Some(AttendanceStatus::Absent)
        );
        assert_eq!(AttendanceStatus::parse("late"), None);
    }

    #[test]
    fn test_entry_uses_natural_key() {
        let now = Utc.with_ymd_and_hms(2024, 11, 5, 15, 0, 0).unwrap();
        let entry = AttendanceEntry::present("s1", "Ana", "c1", day(), now);

        assert_eq!(entry.id, "c1_s1_2024-11-05_present");
        assert!(entry.is_present());
    }

    #[test]
    fn test_entry_date_serializes_as_calendar_day() {
        let now = Utc.with_ymd_and_hms(2024, 11, 5, 15, 0, 0).unwrap();
        let entry = AttendanceEntry::absent("s1", "Ana", "c1", day(), now);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["date"], "2024-11-05");
        assert_eq!(json["status"], "absent");
        assert_eq!(json["studentName"], "Ana");
    }
}
