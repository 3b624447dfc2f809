//! QR scan check-ins.

use chrono::{DateTime, Utc};
use document_store::{DocumentStore, StoreResult};
use entities::AttendanceEntry;

use crate::{AttendanceRepository, ZonePolicy};

/// Result of a single scan. Every case is a value, never an error, so the
/// scanning screen can show a specific message for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A new `present` entry was written.
    Success { entry: AttendanceEntry },
    /// The student already has a `present` entry for today; nothing written.
    AlreadyScanned {
        student_name: String,
        entry: AttendanceEntry,
    },
    /// No student has this code.
    InvalidCode { raw_code: String },
    /// The code belongs to a student of another course.
    NotInCourse { student_name: String },
    /// A store read or write failed; the caller may retry.
    StorageError { message: String },
}

impl ScanOutcome {
    /// Returns true if the scan wrote a new entry.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Turns scanned codes into `present` entries.
#[derive(Debug, Clone)]
pub struct AttendanceRecorder<S> {
    repo: AttendanceRepository<S>,
    zones: ZonePolicy,
}

impl<S: DocumentStore> AttendanceRecorder<S> {
    /// Creates a recorder.
    pub fn new(repo: AttendanceRepository<S>, zones: ZonePolicy) -> Self {
        Self { repo, zones }
    }

    /// Records a scan of `raw_code` in the session of `course_id` at `now`.
    pub async fn record_scan(
        &self,
        raw_code: &str,
        course_id: &str,
        now: DateTime<Utc>,
    ) -> ScanOutcome {
        match self.try_record(raw_code, course_id, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(course_id = %course_id, error = %e, "Scan failed");
                ScanOutcome::StorageError {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_record(
        &self,
        raw_code: &str,
        course_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<ScanOutcome> {
        let code = raw_code.trim();
        let invalid = || ScanOutcome::InvalidCode {
            raw_code: raw_code.to_string(),
        };
        if code.is_empty() {
            return Ok(invalid());
        }

        let Some(student) = self.repo.get_student(code).await? else {
            tracing::info!(course_id = %course_id, code = %code, "Scanned unknown code");
            return Ok(invalid());
        };
        if !student.belongs_to(course_id) {
            tracing::info!(
                course_id = %course_id,
                student_id = %student.id,
                "Scanned student from another course"
            );
            return Ok(ScanOutcome::NotInCourse {
                student_name: student.name,
            });
        }

        let course = self.repo.get_course(course_id).await?;
        let date = self.zones.local_date(course.as_ref(), now);

        let existing = self.repo.entries_for(course_id, &student.id, date).await?;
        if let Some(entry) = existing.into_iter().find(AttendanceEntry::is_present) {
            return Ok(ScanOutcome::AlreadyScanned {
                student_name: entry.student_name.clone(),
                entry,
            });
        }

        let entry = AttendanceEntry::present(&student.id, &student.name, course_id, date, now);
        match self.repo.insert_entry(&entry).await {
            Ok(()) => {
                tracing::info!(
                    course_id = %course_id,
                    student_id = %student.id,
                    date = %date,
                    "Student checked in"
                );
                Ok(ScanOutcome::Success { entry })
            }
            // A concurrent scan won the natural key between our read and write
            Err(e) if e.is_already_exists() => {
                let stored = self.repo.get_entry(&entry.id).await?.unwrap_or(entry);
                Ok(ScanOutcome::AlreadyScanned {
                    student_name: stored.student_name.clone(),
                    entry: stored,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use document_store::Collection;
    use entities::AttendanceStatus;

    use super::*;
    use crate::testing::*;

    fn recorder(repo: &MemoryRepository) -> AttendanceRecorder<document_store::MemoryDocumentStore> {
        AttendanceRecorder::new(repo.clone(), policy())
    }

    #[tokio::test]
    async fn test_scan_then_duplicate_scan() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        seed_student(&repo, "s1", "Ana", "c1").await;
        let recorder = recorder(&repo);

        let first = recorder.record_scan("s1", "c1", at(2024, 11, 5, 15)).await;
        let ScanOutcome::Success { entry } = first else {
            panic!("expected success, got {:?}", first);
        };
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert_eq!(entry.date, day(11, 5));
        assert_eq!(entry.student_name, "Ana");

        let second = recorder
            .record_scan("s1", "c1", at(2024, 11, 5, 15) + chrono::Duration::minutes(5))
            .await;
        assert!(matches!(
            second,
            ScanOutcome::AlreadyScanned { ref student_name, .. } if student_name == "Ana"
        ));
        assert_eq!(store.len(Collection::Attendance).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_and_blank_codes_are_invalid() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        let recorder = recorder(&repo);

        for code in ["unknown-id", "", "   "] {
            let outcome = recorder.record_scan(code, "c1", at(2024, 11, 5, 15)).await;
            assert!(matches!(outcome, ScanOutcome::InvalidCode { .. }), "{:?}", outcome);
        }
        assert_eq!(store.len(Collection::Attendance).await, 0);
    }

    #[tokio::test]
    async fn test_student_of_other_course_is_rejected() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        seed_course(&repo, "c2").await;
        seed_student(&repo, "s4", "Eva", "c2").await;

        let outcome = recorder(&repo)
            .record_scan("s4", "c1", at(2024, 11, 5, 15))
            .await;
        assert_eq!(
            outcome,
            ScanOutcome::NotInCourse {
                student_name: "Eva".to_string()
            }
        );
        assert_eq!(store.len(Collection::Attendance).await, 0);
    }

    #[tokio::test]
    async fn test_scanned_code_is_trimmed() {
        let (_store, repo) = setup();
        seed_course(&repo, "c1").await;
        seed_student(&repo, "s1", "Ana", "c1").await;

        let outcome = recorder(&repo)
            .record_scan(" s1\n", "c1", at(2024, 11, 5, 15))
            .await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_date_uses_course_zone_not_utc() {
        let (_store, repo) = setup();
        seed_course(&repo, "c1").await;
        seed_student(&repo, "s1", "Ana", "c1").await;

        // 02:00 UTC on the 6th is 19:00 on the 5th in Mazatlán
        let outcome = recorder(&repo)
            .record_scan("s1", "c1", at(2024, 11, 6, 2))
            .await;
        let ScanOutcome::Success { entry } = outcome else {
            panic!("expected success");
        };
        assert_eq!(entry.date, day(11, 5));
    }

    #[tokio::test]
    async fn test_next_day_scan_is_a_new_entry() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        seed_student(&repo, "s1", "Ana", "c1").await;
        let recorder = recorder(&repo);

        assert!(recorder.record_scan("s1", "c1", at(2024, 11, 5, 15)).await.is_success());
        assert!(recorder.record_scan("s1", "c1", at(2024, 11, 6, 15)).await.is_success());
        assert_eq!(store.len(Collection::Attendance).await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_scans_write_one_present_entry() {
        const SCANS: usize = 4;
        let repo = AttendanceRepository::new(Arc::new(GatedStore::new(SCANS)));
        seed_course(&repo, "c1").await;
        seed_student(&repo, "s1", "Ana", "c1").await;
        let recorder = Arc::new(AttendanceRecorder::new(repo.clone(), policy()));

        // Every scan passes the duplicate check before any of them writes
        let mut handles = Vec::new();
        for minute in 0..SCANS as i64 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                recorder
                    .record_scan("s1", "c1", at(2024, 11, 5, 15) + chrono::Duration::minutes(minute))
                    .await
            }));
        }
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        let winners: Vec<&AttendanceEntry> = outcomes
            .iter()
            .filter_map(|o| match o {
                ScanOutcome::Success { entry } => Some(entry),
                _ => None,
            })
            .collect();
        assert_eq!(winners.len(), 1);
        for outcome in outcomes.iter().filter(|o| !o.is_success()) {
            let ScanOutcome::AlreadyScanned { student_name, entry } = outcome else {
                panic!("expected already scanned, got {:?}", outcome);
            };
            assert_eq!(student_name, "Ana");
            assert_eq!(entry, winners[0]);
        }

        let stored = repo.entries_on("c1", day(11, 5)).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, AttendanceStatus::Present);
    }
}
