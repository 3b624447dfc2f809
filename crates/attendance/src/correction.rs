//! Fills in the calendar day of entries written without one.
//!
//! Older clients stored only a timestamp. The day is derived from it in the
//! course's zone, the same way a scan derives it.

use chrono::{DateTime, NaiveDate, Utc};
use document_store::{ChangeKind, Collection, DocumentStore, DocumentStoreError, Fields, Filter};
use tokio::task::JoinHandle;

use crate::{repository::fields, AttendanceError, AttendanceRepository, AttendanceResult, ZonePolicy};

#[derive(Debug, Clone)]
pub struct DateCorrector<S> {
    repo: AttendanceRepository<S>,
    zones: ZonePolicy,
}

impl<S: DocumentStore> DateCorrector<S> {
    pub fn new(repo: AttendanceRepository<S>, zones: ZonePolicy) -> Self {
        Self { repo, zones }
    }

    /// Sets the date of one entry if it has none.
    ///
    /// Returns the date written, or `None` if the entry already had one.
    pub async fn correct(&self, entry_id: &str) -> AttendanceResult<Option<NaiveDate>> {
        let doc = self
            .repo
            .store()
            .get(Collection::Attendance, entry_id)
            .await?
            .ok_or_else(|| DocumentStoreError::not_found(Collection::Attendance, entry_id))?;
        if doc.field(fields::DATE).is_some() {
            return Ok(None);
        }

        let timestamp = doc
            .str_field(fields::TIMESTAMP)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| {
                AttendanceError::InvalidInput(format!("entry {} has no valid timestamp", entry_id))
            })?;

        let course = match doc.str_field(fields::COURSE_ID) {
            Some(course_id) => self.repo.get_course(course_id).await?,
            None => None,
        };
        let date = self.zones.local_date(course.as_ref(), timestamp);

        let mut changes = Fields::new();
        changes.insert(
            fields::DATE.to_string(),
            date.format("%Y-%m-%d").to_string().into(),
        );
        self.repo
            .store()
            .update(Collection::Attendance, entry_id, changes)
            .await?;

        tracing::info!(entry_id = %entry_id, date = %date, "Filled in missing attendance date");
        Ok(Some(date))
    }

    /// Corrects every undated entry of a course. Returns how many were fixed.
    pub async fn backfill(&self, course_id: &str) -> AttendanceResult<usize> {
        let filter = Filter::new()
            .eq(fields::COURSE_ID, course_id)
            .missing(fields::DATE);
        self.correct_matching(&filter).await
    }

    /// Corrects every undated entry in the store, whichever process wrote it.
    pub async fn backfill_all(&self) -> AttendanceResult<usize> {
        self.correct_matching(&Filter::new().missing(fields::DATE))
            .await
    }

    async fn correct_matching(&self, filter: &Filter) -> AttendanceResult<usize> {
        let docs = self
            .repo
            .store()
            .find(Collection::Attendance, filter)
            .await?;

        let mut corrected = 0;
        for doc in docs {
            match self.correct(&doc.id).await {
                Ok(Some(_)) => corrected += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(entry_id = %doc.id, error = %e, "Could not fill in date");
                }
            }
        }
        Ok(corrected)
    }
}

impl<S: DocumentStore + 'static> DateCorrector<S> {
    /// Corrects undated entries as they are created, until the store closes
    /// or the returned task is aborted.
    ///
    /// Only writes made through this store instance are seen; entries written
    /// to the same database by another process need [`Self::backfill_all`].
    pub fn watch(&self) -> JoinHandle<()> {
        let mut subscription = self.repo.store().subscribe(
            Collection::Attendance,
            Filter::new().missing(fields::DATE),
        );
        let corrector = Self {
            repo: self.repo.clone(),
            zones: self.zones,
        };

        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                if event.kind != ChangeKind::Created {
                    continue;
                }
                if let Err(e) = corrector.correct(&event.document.id).await {
                    tracing::warn!(entry_id = %event.document.id, error = %e, "Could not fill in date");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use entities::AttendanceEntry;

    use super::*;
    use crate::testing::*;

    fn undated(course_id: &str, timestamp: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("courseId".to_string(), course_id.into());
        fields.insert("studentId".to_string(), "s1".into());
        fields.insert("studentName".to_string(), "Ana".into());
        fields.insert("status".to_string(), "present".into());
        fields.insert("timestamp".to_string(), timestamp.into());
        fields
    }

    #[tokio::test]
    async fn test_correct_uses_course_zone() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        let id = store
            .create(Collection::Attendance, undated("c1", "2024-11-06T02:00:00Z"))
            .await
            .unwrap();

        let corrector = DateCorrector::new(repo.clone(), policy());
        assert_eq!(corrector.correct(&id).await.unwrap(), Some(day(11, 5)));
        // Second pass leaves it alone
        assert_eq!(corrector.correct(&id).await.unwrap(), None);

        let entry = repo.get_entry(&id).await.unwrap().unwrap();
        assert_eq!(entry.date, day(11, 5));
    }

    #[tokio::test]
    async fn test_dated_entries_are_untouched() {
        let (_store, repo) = setup();
        let entry = AttendanceEntry::present("s1", "Ana", "c1", day(11, 5), at(2024, 11, 9, 15));
        repo.insert_entry(&entry).await.unwrap();

        let corrector = DateCorrector::new(repo.clone(), policy());
        assert_eq!(corrector.correct(&entry.id).await.unwrap(), None);
        assert_eq!(repo.get_entry(&entry.id).await.unwrap().unwrap().date, day(11, 5));
    }

    #[tokio::test]
    async fn test_bad_timestamp_is_rejected() {
        let (store, repo) = setup();
        let id = store
            .create(Collection::Attendance, undated("c1", "yesterday"))
            .await
            .unwrap();

        let err = DateCorrector::new(repo, policy())
            .correct(&id)
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_backfill_only_touches_course() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        for ts in ["2024-11-05T15:00:00Z", "2024-11-06T15:00:00Z"] {
            store.create(Collection::Attendance, undated("c1", ts)).await.unwrap();
        }
        store
            .create(Collection::Attendance, undated("c2", "2024-11-05T15:00:00Z"))
            .await
            .unwrap();

        let corrector = DateCorrector::new(repo.clone(), policy());
        assert_eq!(corrector.backfill("c1").await.unwrap(), 2);
        assert_eq!(corrector.backfill("c1").await.unwrap(), 0);
        assert_eq!(repo.entries_for_course("c1").await.unwrap().len(), 2);
        assert!(repo.entries_for_course("c2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backfill_all_covers_every_course() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        store
            .create(Collection::Attendance, undated("c1", "2024-11-06T02:00:00Z"))
            .await
            .unwrap();
        store
            .create(Collection::Attendance, undated("c2", "2024-11-05T15:00:00Z"))
            .await
            .unwrap();
        let broken = store
            .create(Collection::Attendance, undated("c2", "not a time"))
            .await
            .unwrap();

        let corrector = DateCorrector::new(repo.clone(), policy());
        assert_eq!(corrector.backfill_all().await.unwrap(), 2);

        let c1 = repo.entries_for_course("c1").await.unwrap();
        assert_eq!(c1.len(), 1);
        assert_eq!(c1[0].date, day(11, 5));
        assert_eq!(repo.entries_for_course("c2").await.unwrap().len(), 1);
        // The unparseable entry is left undated and skipped again next time
        assert!(store
            .get(Collection::Attendance, &broken)
            .await
            .unwrap()
            .unwrap()
            .field("date")
            .is_none());
        assert_eq!(corrector.backfill_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_watch_corrects_new_entries() {
        let (store, repo) = setup();
        seed_course(&repo, "c1").await;
        let watcher = DateCorrector::new(repo.clone(), policy()).watch();

        let id = store
            .create(Collection::Attendance, undated("c1", "2024-11-05T15:00:00Z"))
            .await
            .unwrap();

        let mut date = None;
        for _ in 0..50 {
            if let Some(entry) = repo.get_entry(&id).await.ok().flatten() {
                date = Some(entry.date);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        watcher.abort();
        assert_eq!(date, Some(day(11, 5)));
    }
}
