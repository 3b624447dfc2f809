//! Typed access to students, courses and attendance entries.

use std::sync::Arc;

use chrono::NaiveDate;
use document_store::{Collection, Document, DocumentStore, Filter, StoreResult};
use entities::{sort_roster, AttendanceEntry, Course, Student};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Field names shared by the persisted documents.
pub mod fields {
    pub const COURSE_ID: &str = "courseId";
    pub const STUDENT_ID: &str = "studentId";
    pub const TEACHER_ID: &str = "teacherId";
    pub const TIME_ZONE: &str = "timeZone";
    pub const DATE: &str = "date";
    pub const TIMESTAMP: &str = "timestamp";
}

fn date_value(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Decodes documents, skipping (and logging) any that do not fit the entity.
fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match doc.decode() {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(%collection, id = %doc.id, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect()
}

/// Typed repository over a [`DocumentStore`].
#[derive(Debug)]
pub struct AttendanceRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for AttendanceRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> AttendanceRepository<S> {
    /// Creates a repository over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ========== Students ==========

    /// Gets a student by ID.
    pub async fn get_student(&self, id: &str) -> StoreResult<Option<Student>> {
        self.store
            .get(Collection::Students, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Lists a course's students ordered by name, then ID.
    pub async fn roster(&self, course_id: &str) -> StoreResult<Vec<Student>> {
        let filter = Filter::new().eq(fields::COURSE_ID, course_id);
        let docs = self.store.find(Collection::Students, &filter).await?;
        let mut students: Vec<Student> = decode_all(Collection::Students, docs);
        sort_roster(&mut students);
        Ok(students)
    }

    /// Inserts a student under its own ID.
    pub async fn insert_student(&self, student: &Student) -> StoreResult<()> {
        self.store
            .insert(Collection::Students, &student.id, Document::encode(student)?)
            .await
    }

    // ========== Courses ==========

    /// Gets a course by ID.
    pub async fn get_course(&self, id: &str) -> StoreResult<Option<Course>> {
        self.store
            .get(Collection::Courses, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Lists courses, optionally only those of one teacher, ordered by name.
    pub async fn list_courses(&self, teacher_id: Option<&str>) -> StoreResult<Vec<Course>> {
        let filter = match teacher_id {
            Some(teacher_id) => Filter::new().eq(fields::TEACHER_ID, teacher_id),
            None => Filter::new(),
        };
        let docs = self.store.find(Collection::Courses, &filter).await?;
        let mut courses: Vec<Course> = decode_all(Collection::Courses, docs);
        courses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(courses)
    }

    /// Inserts a course under its own ID.
    pub async fn insert_course(&self, course: &Course) -> StoreResult<()> {
        self.store
            .insert(Collection::Courses, &course.id, Document::encode(course)?)
            .await
    }

    /// Overwrites a course's fields.
    ///
    /// Unset optional fields are written as null so that a merge clears
    /// the previously stored value.
    pub async fn save_course(&self, course: &Course) -> StoreResult<()> {
        let mut body = Document::encode(course)?;
        for key in [fields::TEACHER_ID, fields::TIME_ZONE] {
            body.entry(key.to_string()).or_insert(Value::Null);
        }
        self.store
            .update(Collection::Courses, &course.id, body)
            .await
    }

    // ========== Attendance ==========

    /// Gets an attendance entry by ID.
    pub async fn get_entry(&self, id: &str) -> StoreResult<Option<AttendanceEntry>> {
        self.store
            .get(Collection::Attendance, id)
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Lists the entries of one student in one course on one day.
    pub async fn entries_for(
        &self,
        course_id: &str,
        student_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceEntry>> {
        let filter = Filter::new()
            .eq(fields::COURSE_ID, course_id)
            .eq(fields::STUDENT_ID, student_id)
            .eq(fields::DATE, date_value(date));
        self.find_entries(&filter).await
    }

    /// Lists every entry of a course on one day, regardless of status.
    pub async fn entries_on(
        &self,
        course_id: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceEntry>> {
        let filter = Filter::new()
            .eq(fields::COURSE_ID, course_id)
            .eq(fields::DATE, date_value(date));
        self.find_entries(&filter).await
    }

    /// Lists entries of a course dated within `[from, to]`.
    pub async fn entries_between(
        &self,
        course_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceEntry>> {
        let filter = Filter::new()
            .eq(fields::COURSE_ID, course_id)
            .gte(fields::DATE, date_value(from))
            .lte(fields::DATE, date_value(to));
        self.find_entries(&filter).await
    }

    /// Lists every dated entry of a course.
    pub async fn entries_for_course(&self, course_id: &str) -> StoreResult<Vec<AttendanceEntry>> {
        let filter = Filter::new().eq(fields::COURSE_ID, course_id);
        let docs = self.store.find(Collection::Attendance, &filter).await?;
        let dated = docs
            .into_iter()
            .filter(|doc| doc.field(fields::DATE).is_some())
            .collect();
        Ok(decode_all(Collection::Attendance, dated))
    }

    /// Inserts an entry under its ID, failing if that ID is taken.
    pub async fn insert_entry(&self, entry: &AttendanceEntry) -> StoreResult<()> {
        self.store
            .insert(Collection::Attendance, &entry.id, Document::encode(entry)?)
            .await
    }

    async fn find_entries(&self, filter: &Filter) -> StoreResult<Vec<AttendanceEntry>> {
        let docs = self.store.find(Collection::Attendance, filter).await?;
        Ok(decode_all(Collection::Attendance, docs))
    }
}
