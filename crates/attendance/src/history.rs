//! Past sessions of a course.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use document_store::DocumentStore;
use entities::AttendanceEntry;
use serde::{Deserialize, Serialize};

use crate::{AttendanceError, AttendanceRepository, AttendanceResult};

/// Counts for one session day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub present_count: usize,
    pub absent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub student_id: String,
    pub name: String,
}

/// Who attended on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub course_id: String,
    pub date: NaiveDate,
    pub present: Vec<StudentRef>,
    pub absent: Vec<StudentRef>,
    /// Students on the roster with no entry that day.
    pub unrecorded: Vec<StudentRef>,
}

/// One decision per student: a `present` entry beats an `absent` one.
fn decide(entries: Vec<AttendanceEntry>) -> HashMap<String, AttendanceEntry> {
    let mut decided: HashMap<String, AttendanceEntry> = HashMap::new();
    for entry in entries {
        match decided.get(&entry.student_id) {
            Some(current) if current.is_present() || !entry.is_present() => {}
            _ => {
                decided.insert(entry.student_id.clone(), entry);
            }
        }
    }
    decided
}

fn sort_refs(refs: &mut [StudentRef]) {
    refs.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
}

/// Read-only views over a course's recorded sessions.
#[derive(Debug, Clone)]
pub struct AttendanceHistory<S> {
    repo: AttendanceRepository<S>,
}

impl<S: DocumentStore> AttendanceHistory<S> {
    pub fn new(repo: AttendanceRepository<S>) -> Self {
        Self { repo }
    }

    /// Lists every day with at least one entry, newest first.
    pub async fn session_days(&self, course_id: &str) -> AttendanceResult<Vec<DaySummary>> {
        self.ensure_course(course_id).await?;

        let entries = self.repo.entries_for_course(course_id).await?;
        let mut by_day: BTreeMap<NaiveDate, Vec<AttendanceEntry>> = BTreeMap::new();
        for entry in entries {
            by_day.entry(entry.date).or_default().push(entry);
        }

        let summaries = by_day
            .into_iter()
            .rev()
            .map(|(date, entries)| {
                let decided = decide(entries);
                let present_count = decided.values().filter(|e| e.is_present()).count();
                DaySummary {
                    date,
                    present_count,
                    absent_count: decided.len() - present_count,
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Splits the course's roster by what was recorded on `date`.
    pub async fn day_detail(&self, course_id: &str, date: NaiveDate) -> AttendanceResult<DayDetail> {
        self.ensure_course(course_id).await?;

        let decided = decide(self.repo.entries_on(course_id, date).await?);
        let roster = self.repo.roster(course_id).await?;

        let mut present = Vec::new();
        let mut absent = Vec::new();
        for entry in decided.values() {
            let student = StudentRef {
                student_id: entry.student_id.clone(),
                name: entry.student_name.clone(),
            };
            if entry.is_present() {
                present.push(student);
            } else {
                absent.push(student);
            }
        }
        sort_refs(&mut present);
        sort_refs(&mut absent);

        let recorded: HashSet<&str> = decided.keys().map(String::as_str).collect();
        let unrecorded = roster
            .into_iter()
            .filter(|s| !recorded.contains(s.id.as_str()))
            .map(|s| StudentRef {
                student_id: s.id,
                name: s.name,
            })
            .collect();

        Ok(DayDetail {
            course_id: course_id.to_string(),
            date,
            present,
            absent,
            unrecorded,
        })
    }

    async fn ensure_course(&self, course_id: &str) -> AttendanceResult<()> {
        match self.repo.get_course(course_id).await? {
            Some(_) => Ok(()),
            None => Err(AttendanceError::CourseNotFound(course_id.to_string())),
        }
    }
}
