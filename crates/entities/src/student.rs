//! Student entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student enrolled in exactly one course.
///
/// The `id` is chosen by the teacher and is the value encoded in the
/// student's QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Unique identifier (QR payload).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning course ID.
    pub course_id: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Creates a new student in the given course.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            course_id: course_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns true if the student belongs to the given course.
    pub fn belongs_to(&self, course_id: &str) -> bool {
        self.course_id == course_id
    }
}

/// Orders a roster by name, breaking ties by ID.
pub fn sort_roster(students: &mut [Student]) {
    students.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}
