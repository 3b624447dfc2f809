//! Course and student management.

use chrono::Utc;
use document_store::{Collection, DocumentStore, Filter, WriteOp};
use entities::{Course, Student};
use serde::{Deserialize, Serialize};

use crate::{
    parse_zone, repository::fields, AttendanceError, AttendanceRepository, AttendanceResult,
};

/// Input for creating a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub name: String,
    pub group_name: String,
    pub school_year: String,
    pub teacher_id: Option<String>,
    pub time_zone: Option<String>,
}

/// Changes to a course. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChanges {
    pub name: Option<String>,
    pub group_name: Option<String>,
    pub school_year: Option<String>,
    pub time_zone: Option<String>,
}

/// Documents removed by a cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeSummary {
    pub students_removed: usize,
    pub entries_removed: usize,
    /// Deletes that failed; running the delete again retries them.
    pub failed: usize,
}

fn required(field: &str, value: &str) -> AttendanceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AttendanceError::required(field));
    }
    Ok(value.to_string())
}

fn checked_zone(time_zone: Option<&str>) -> AttendanceResult<Option<String>> {
    match time_zone.map(str::trim).filter(|tz| !tz.is_empty()) {
        Some(tz) => parse_zone(tz).map(|zone| Some(zone.name().to_string())),
        None => Ok(None),
    }
}

/// Roster management used by the course and student screens.
#[derive(Debug, Clone)]
pub struct RosterService<S> {
    repo: AttendanceRepository<S>,
}

impl<S: DocumentStore> RosterService<S> {
    /// Creates a roster service.
    pub fn new(repo: AttendanceRepository<S>) -> Self {
        Self { repo }
    }

    /// Creates a course.
    pub async fn create_course(&self, input: NewCourse) -> AttendanceResult<Course> {
        let mut course = Course::new(
            required("name", &input.name)?,
            required("groupName", &input.group_name)?,
            required("schoolYear", &input.school_year)?,
        );
        if let Some(teacher_id) = input.teacher_id.as_deref().map(str::trim) {
            if !teacher_id.is_empty() {
                course = course.with_teacher(teacher_id);
            }
        }
        if let Some(time_zone) = checked_zone(input.time_zone.as_deref())? {
            course = course.with_time_zone(time_zone);
        }

        self.repo.insert_course(&course).await?;
        tracing::info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    /// Gets a course.
    pub async fn get_course(&self, course_id: &str) -> AttendanceResult<Course> {
        self.repo
            .get_course(course_id)
            .await?
            .ok_or_else(|| AttendanceError::CourseNotFound(course_id.to_string()))
    }

    /// Lists courses, optionally only one teacher's.
    pub async fn list_courses(&self, teacher_id: Option<&str>) -> AttendanceResult<Vec<Course>> {
        Ok(self.repo.list_courses(teacher_id).await?)
    }

    /// Applies changes to a course.
    pub async fn update_course(
        &self,
        course_id: &str,
        changes: CourseChanges,
    ) -> AttendanceResult<Course> {
        let mut course = self.get_course(course_id).await?;

        if let Some(name) = changes.name {
            course.name = required("name", &name)?;
        }
        if let Some(group_name) = changes.group_name {
            course.group_name = required("groupName", &group_name)?;
        }
        if let Some(school_year) = changes.school_year {
            course.school_year = required("schoolYear", &school_year)?;
        }
        if let Some(time_zone) = changes.time_zone {
            // An empty zone clears the override
            course.time_zone = checked_zone(Some(&time_zone))?;
        }
        course.updated_at = Utc::now();

        self.repo.save_course(&course).await?;
        tracing::info!(course_id = %course_id, "Course updated");
        Ok(course)
    }

    /// Deletes a course with its students and attendance entries.
    pub async fn delete_course(&self, course_id: &str) -> AttendanceResult<CascadeSummary> {
        self.get_course(course_id).await?;

        let by_course = Filter::new().eq(fields::COURSE_ID, course_id);
        let mut summary = self.delete_matching(Collection::Attendance, &by_course).await?;
        let students = self.delete_matching(Collection::Students, &by_course).await?;
        summary.students_removed = students.entries_removed;
        summary.failed += students.failed;

        self.repo
            .store()
            .delete(Collection::Courses, course_id)
            .await?;

        tracing::info!(
            course_id = %course_id,
            students = summary.students_removed,
            entries = summary.entries_removed,
            failed = summary.failed,
            "Course deleted"
        );
        Ok(summary)
    }

    /// Adds a student to a course. The ID is the student's QR payload and
    /// must be unique.
    pub async fn add_student(
        &self,
        course_id: &str,
        student_id: &str,
        name: &str,
    ) -> AttendanceResult<Student> {
        let student_id = required("studentId", student_id)?;
        let name = required("name", name)?;
        self.get_course(course_id).await?;

        let student = Student::new(student_id, name, course_id);
        match self.repo.insert_student(&student).await {
            Ok(()) => {
                tracing::info!(course_id = %course_id, student_id = %student.id, "Student added");
                Ok(student)
            }
            Err(e) if e.is_already_exists() => {
                Err(AttendanceError::StudentAlreadyExists(student.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists a course's students ordered by name.
    pub async fn list_students(&self, course_id: &str) -> AttendanceResult<Vec<Student>> {
        self.get_course(course_id).await?;
        Ok(self.repo.roster(course_id).await?)
    }

    /// Removes a student and their attendance entries.
    pub async fn remove_student(&self, student_id: &str) -> AttendanceResult<CascadeSummary> {
        let student = self
            .repo
            .get_student(student_id)
            .await?
            .ok_or_else(|| AttendanceError::StudentNotFound(student_id.to_string()))?;

        let by_student = Filter::new()
            .eq(fields::COURSE_ID, student.course_id.as_str())
            .eq(fields::STUDENT_ID, student.id.as_str());
        let mut summary = self.delete_matching(Collection::Attendance, &by_student).await?;

        self.repo
            .store()
            .delete(Collection::Students, &student.id)
            .await?;
        summary.students_removed = 1;

        tracing::info!(
            course_id = %student.course_id,
            student_id = %student.id,
            entries = summary.entries_removed,
            "Student removed"
        );
        Ok(summary)
    }

    /// Deletes every document matching `filter`; counts go in `entries_removed`.
    async fn delete_matching(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> AttendanceResult<CascadeSummary> {
        let docs = self.repo.store().find(collection, filter).await?;
        let ops = docs
            .into_iter()
            .map(|doc| WriteOp::Delete {
                collection,
                id: doc.id,
            })
            .collect();

        let mut summary = CascadeSummary::default();
        for result in self.repo.store().batch_write(ops).await {
            match result {
                Ok(_) => summary.entries_removed += 1,
                Err(e) => {
                    tracing::warn!(%collection, error = %e, "Cascade delete failed");
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{testing::*, AttendanceRecorder, ScanOutcome, SessionFinalizer};

    fn new_course(name: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            group_name: "Grupo A".to_string(),
            school_year: "2024-2025".to_string(),
            teacher_id: Some("t1".to_string()),
            time_zone: None,
        }
    }

    #[tokio::test]
    async fn test_create_course_validates_fields() {
        let (_store, repo) = setup();
        let roster = RosterService::new(repo);

        let mut blank = new_course("  ");
        let err = roster.create_course(blank.clone()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));

        blank.name = "Math".to_string();
        blank.time_zone = Some("Not/AZone".to_string());
        let err = roster.create_course(blank).await.unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidTimeZone(_)));

        let mut good = new_course(" Math ");
        good.time_zone = Some("Europe/Madrid".to_string());
        let course = roster.create_course(good).await.unwrap();
        assert_eq!(course.name, "Math");
        assert_eq!(course.time_zone.as_deref(), Some("Europe/Madrid"));
    }

    #[tokio::test]
    async fn test_list_courses_by_teacher() {
        let (_store, repo) = setup();
        let roster = RosterService::new(repo);
        roster.create_course(new_course("Physics")).await.unwrap();
        roster.create_course(new_course("Biology")).await.unwrap();
        let mut other = new_course("Chemistry");
        other.teacher_id = Some("t2".to_string());
        roster.create_course(other).await.unwrap();

        let mine = roster.list_courses(Some("t1")).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Biology", "Physics"]);
        assert_eq!(roster.list_courses(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_course() {
        let (_store, repo) = setup();
        let roster = RosterService::new(repo);
        let course = roster.create_course(new_course("Math")).await.unwrap();

        let updated = roster
            .update_course(
                &course.id,
                CourseChanges {
                    group_name: Some("Grupo B".to_string()),
                    time_zone: Some("America/Mexico_City".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Math");
        assert_eq!(updated.group_name, "Grupo B");
        assert_eq!(updated.time_zone.as_deref(), Some("America/Mexico_City"));

        let cleared = roster
            .update_course(
                &course.id,
                CourseChanges {
                    time_zone: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.time_zone.is_none());
        assert_eq!(roster.get_course(&course.id).await.unwrap(), cleared);
    }

    #[tokio::test]
    async fn test_cleared_zone_falls_back_to_default_for_scans() {
        let (_store, repo) = setup();
        let roster = RosterService::new(repo.clone());
        let mut madrid = new_course("Math");
        madrid.time_zone = Some("Europe/Madrid".to_string());
        let course = roster.create_course(madrid).await.unwrap();
        roster.add_student(&course.id, "s1", "Ana").await.unwrap();

        roster
            .update_course(
                &course.id,
                CourseChanges {
                    time_zone: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let stored = repo.get_course(&course.id).await.unwrap().unwrap();
        assert!(stored.time_zone.is_none());

        // 23:30 UTC on the 5th is already the 6th in Madrid but still the 5th in Mazatlán
        let scanned = Utc.with_ymd_and_hms(2024, 11, 5, 23, 30, 0).unwrap();
        let outcome = AttendanceRecorder::new(repo.clone(), policy())
            .record_scan("s1", &course.id, scanned)
            .await;
        let ScanOutcome::Success { entry } = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(entry.date, day(11, 5));
    }

    #[tokio::test]
    async fn test_add_student_rejects_duplicates_and_unknown_course() {
        let (_store, repo) = setup();
        let roster = RosterService::new(repo);
        let course = roster.create_course(new_course("Math")).await.unwrap();

        roster.add_student(&course.id, "A-001", "Ana").await.unwrap();
        let err = roster
            .add_student(&course.id, " A-001 ", "Ana Again")
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::StudentAlreadyExists(id) if id == "A-001"));

        let err = roster.add_student("nope", "B-002", "Beto").await.unwrap_err();
        assert!(matches!(err, AttendanceError::CourseNotFound(_)));

        let err = roster.add_student(&course.id, "", "Beto").await.unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_course_cascades() {
        let (store, repo) = setup();
        let roster = RosterService::new(repo.clone());
        let course = roster.create_course(new_course("Math")).await.unwrap();
        let keep = roster.create_course(new_course("Art")).await.unwrap();
        roster.add_student(&course.id, "s1", "Ana").await.unwrap();
        roster.add_student(&course.id, "s2", "Beto").await.unwrap();
        roster.add_student(&keep.id, "s3", "Carla").await.unwrap();

        AttendanceRecorder::new(repo.clone(), policy())
            .record_scan("s1", &course.id, at(2024, 11, 5, 15))
            .await;
        SessionFinalizer::new(repo.clone())
            .finalize_session(&course.id, day(11, 5))
            .await
            .unwrap();
        SessionFinalizer::new(repo.clone())
            .finalize_session(&keep.id, day(11, 5))
            .await
            .unwrap();

        let summary = roster.delete_course(&course.id).await.unwrap();
        assert_eq!(
            summary,
            CascadeSummary {
                students_removed: 2,
                entries_removed: 2,
                failed: 0
            }
        );
        assert_eq!(store.len(Collection::Courses).await, 1);
        assert_eq!(store.len(Collection::Students).await, 1);
        assert_eq!(store.len(Collection::Attendance).await, 1);
    }

    #[tokio::test]
    async fn test_remove_student_cascades_to_entries() {
        let (store, repo) = setup();
        let roster = RosterService::new(repo.clone());
        let course = roster.create_course(new_course("Math")).await.unwrap();
        roster.add_student(&course.id, "s1", "Ana").await.unwrap();
        roster.add_student(&course.id, "s2", "Beto").await.unwrap();
        SessionFinalizer::new(repo.clone())
            .finalize_session(&course.id, day(11, 5))
            .await
            .unwrap();

        let summary = roster.remove_student("s1").await.unwrap();
        assert_eq!(summary.students_removed, 1);
        assert_eq!(summary.entries_removed, 1);
        assert_eq!(store.len(Collection::Attendance).await, 1);
        assert_eq!(roster.list_students(&course.id).await.unwrap().len(), 1);

        let err = roster.remove_student("s1").await.unwrap_err();
        assert!(matches!(err, AttendanceError::StudentNotFound(_)));
    }
}
