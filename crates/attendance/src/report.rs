//! Monthly attendance grid.

use std::collections::HashMap;

use chrono::NaiveDate;
use document_store::DocumentStore;
use entities::{sort_roster, AttendanceEntry, AttendanceStatus, Course, Student, YearMonth};
use serde::{Deserialize, Serialize};

use crate::{AttendanceError, AttendanceRepository, AttendanceResult};

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    /// No entry: no session was held or it was never finalized.
    #[serde(rename = "-")]
    NoRecord,
}

impl Mark {
    pub fn as_char(&self) -> char {
        match self {
            Self::Present => 'P',
            Self::Absent => 'A',
            Self::NoRecord => '-',
        }
    }
}

/// One student's row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub student_id: String,
    pub student_name: String,
    /// One mark per day column.
    pub marks: Vec<Mark>,
    pub present_count: usize,
    pub absent_count: usize,
}

/// Course metadata printed above the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportHeader {
    pub course_id: String,
    pub course_name: String,
    pub group_name: String,
    pub school_year: String,
    pub year_month: YearMonth,
}

/// Dense per-student/per-day attendance matrix for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMatrix {
    pub header: ReportHeader,
    /// Every day of the month, in order.
    pub days: Vec<NaiveDate>,
    /// Students ordered by name, then ID.
    pub rows: Vec<ReportRow>,
}

impl ReportMatrix {
    /// Returns the mark for a row and day column.
    pub fn mark(&self, row: usize, day: usize) -> Option<Mark> {
        self.rows.get(row)?.marks.get(day).copied()
    }

    /// Returns the row of a student.
    pub fn row_for(&self, student_id: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.student_id == student_id)
    }
}

/// Folds a month of entries into a matrix. Pure: performs no I/O.
///
/// Entries of other courses or outside the month are ignored. If a student
/// has both a present and an absent entry for a day (a late scan after the
/// session was closed) the day counts as present.
pub fn build_matrix(
    course: &Course,
    year_month: YearMonth,
    roster: &[Student],
    entries: &[AttendanceEntry],
) -> ReportMatrix {
    let days = year_month.days();

    let mut statuses: HashMap<(&str, NaiveDate), AttendanceStatus> = HashMap::new();
    for entry in entries
        .iter()
        .filter(|e| e.course_id == course.id && year_month.contains(e.date))
    {
        statuses
            .entry((entry.student_id.as_str(), entry.date))
            .and_modify(|status| {
                if entry.is_present() {
                    *status = AttendanceStatus::Present;
                }
            })
            .or_insert(entry.status);
    }

    let mut students = roster.to_vec();
    sort_roster(&mut students);

    let rows = students
        .into_iter()
        .map(|student| {
            let marks: Vec<Mark> = days
                .iter()
                .map(|d| match statuses.get(&(student.id.as_str(), *d)) {
                    Some(AttendanceStatus::Present) => Mark::Present,
                    Some(AttendanceStatus::Absent) => Mark::Absent,
                    None => Mark::NoRecord,
                })
                .collect();
            let present_count = marks.iter().filter(|m| **m == Mark::Present).count();
            let absent_count = marks.iter().filter(|m| **m == Mark::Absent).count();
            ReportRow {
                student_id: student.id,
                student_name: student.name,
                marks,
                present_count,
                absent_count,
            }
        })
        .collect();

    ReportMatrix {
        header: ReportHeader {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            group_name: course.group_name.clone(),
            school_year: course.school_year.clone(),
            year_month,
        },
        days,
        rows,
    }
}

/// Reads a month of entries and builds the report.
#[derive(Debug, Clone)]
pub struct MonthlyReportBuilder<S> {
    repo: AttendanceRepository<S>,
}

impl<S: DocumentStore> MonthlyReportBuilder<S> {
    /// Creates a report builder.
    pub fn new(repo: AttendanceRepository<S>) -> Self {
        Self { repo }
    }

    /// Builds the matrix for `course_id` in `year_month`.
    pub async fn build_monthly_matrix(
        &self,
        course_id: &str,
        year_month: YearMonth,
    ) -> AttendanceResult<ReportMatrix> {
        let course = self
            .repo
            .get_course(course_id)
            .await?
            .ok_or_else(|| AttendanceError::CourseNotFound(course_id.to_string()))?;
        let roster = self.repo.roster(course_id).await?;
        let entries = self
            .repo
            .entries_between(course_id, year_month.first_day(), year_month.last_day())
            .await?;

        tracing::debug!(
            course_id = %course_id,
            month = %year_month,
            students = roster.len(),
            entries = entries.len(),
            "Building monthly report"
        );

        Ok(build_matrix(&course, year_month, &roster, &entries))
    }
}
