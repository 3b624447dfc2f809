//! Course entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course (class roster) owned by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier.
    pub id: String,
    /// Course name.
    pub name: String,
    /// Group name.
    pub group_name: String,
    /// School year, e.g. `2024-2025`.
    pub school_year: String,
    /// Owning teacher (None when created without an authenticated teacher).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    /// IANA time zone overriding the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course.
    pub fn new(
        name: impl Into<String>,
        group_name: impl Into<String>,
        school_year: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            group_name: group_name.into(),
            school_year: school_year.into(),
            teacher_id: None,
            time_zone: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the owning teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    /// Sets the course time zone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }
}
