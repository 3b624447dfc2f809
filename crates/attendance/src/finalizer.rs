//! Closing a session: absences for everyone not scanned.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use document_store::{Collection, Document, DocumentStore, WriteOp};
use entities::AttendanceEntry;
use serde::{Deserialize, Serialize};

use crate::{AttendanceError, AttendanceRepository, AttendanceResult};

/// An absence that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedAbsence {
    pub student_id: String,
    pub student_name: String,
    pub error: String,
}

/// What a finalization did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSummary {
    pub course_id: String,
    pub date: NaiveDate,
    /// Absence entries written by this call.
    pub absences_created: usize,
    /// Roster students that already had an entry for the day.
    pub already_decided: usize,
    /// Absences whose write failed. Re-running finalization retries only these.
    pub failed: Vec<FailedAbsence>,
}

impl FinalizeSummary {
    /// Returns true if every absence write succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Backfills `absent` entries when a teacher ends attendance-taking.
#[derive(Debug, Clone)]
pub struct SessionFinalizer<S> {
    repo: AttendanceRepository<S>,
}

impl<S: DocumentStore> SessionFinalizer<S> {
    /// Creates a finalizer.
    pub fn new(repo: AttendanceRepository<S>) -> Self {
        Self { repo }
    }

    /// Finalizes the session of `course_id` for `today`.
    pub async fn finalize_session(
        &self,
        course_id: &str,
        today: NaiveDate,
    ) -> AttendanceResult<FinalizeSummary> {
        self.finalize_session_at(course_id, today, Utc::now()).await
    }

    /// Finalizes the session, stamping absences with `now`.
    ///
    /// Any existing entry for the day, present or absent, counts as decided,
    /// so calling this again for the same day writes nothing new. Writes are
    /// not atomic across the roster; failures are reported, not rolled back.
    pub async fn finalize_session_at(
        &self,
        course_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AttendanceResult<FinalizeSummary> {
        if self.repo.get_course(course_id).await?.is_none() {
            return Err(AttendanceError::CourseNotFound(course_id.to_string()));
        }

        let roster = self.repo.roster(course_id).await?;
        let entries = self.repo.entries_on(course_id, today).await?;
        let decided: HashSet<&str> = entries.iter().map(|e| e.student_id.as_str()).collect();

        let absentees: Vec<AttendanceEntry> = roster
            .iter()
            .filter(|s| !decided.contains(s.id.as_str()))
            .map(|s| AttendanceEntry::absent(&s.id, &s.name, course_id, today, now))
            .collect();
        let mut already_decided = roster.len() - absentees.len();

        let mut ops = Vec::with_capacity(absentees.len());
        for entry in &absentees {
            ops.push(WriteOp::Insert {
                collection: Collection::Attendance,
                id: entry.id.clone(),
                fields: Document::encode(entry)?,
            });
        }
        let results = self.repo.store().batch_write(ops).await;

        let mut absences_created = 0;
        let mut failed = Vec::new();
        for (entry, result) in absentees.iter().zip(results) {
            match result {
                Ok(_) => absences_created += 1,
                // Another finalization marked this student first
                Err(e) if e.is_already_exists() => already_decided += 1,
                Err(e) => {
                    tracing::warn!(
                        course_id = %course_id,
                        student_id = %entry.student_id,
                        error = %e,
                        "Failed to write absence"
                    );
                    failed.push(FailedAbsence {
                        student_id: entry.student_id.clone(),
                        student_name: entry.student_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            course_id = %course_id,
            date = %today,
            absences_created,
            already_decided,
            failed = failed.len(),
            "Session finalized"
        );

        Ok(FinalizeSummary {
            course_id: course_id.to_string(),
            date: today,
            absences_created,
            already_decided,
            failed,
        })
    }
}
