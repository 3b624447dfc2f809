//! Shared fixtures for unit tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use document_store::{
    Collection, Document, DocumentStore, Fields, Filter, MemoryDocumentStore, StoreResult,
    Subscription,
};
use entities::{Course, Student};
use tokio::sync::Barrier;

use crate::{AttendanceRepository, ZonePolicy};

pub(crate) type MemoryRepository = AttendanceRepository<MemoryDocumentStore>;

pub(crate) fn setup() -> (Arc<MemoryDocumentStore>, MemoryRepository) {
    let store = Arc::new(MemoryDocumentStore::new());
    let repo = AttendanceRepository::new(store.clone());
    (store, repo)
}

pub(crate) fn policy() -> ZonePolicy {
    ZonePolicy::new(chrono_tz::America::Mazatlan)
}

/// A day in November/December 2024.
pub(crate) fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub(crate) async fn seed_course<S: DocumentStore>(
    repo: &AttendanceRepository<S>,
    id: &str,
) -> Course {
    let mut course = Course::new(format!("Course {}", id), "Grupo A", "2024-2025");
    course.id = id.to_string();
    repo.insert_course(&course).await.unwrap();
    course
}

pub(crate) async fn seed_student<S: DocumentStore>(
    repo: &AttendanceRepository<S>,
    id: &str,
    name: &str,
    course_id: &str,
) -> Student {
    let student = Student::new(id, name, course_id);
    repo.insert_student(&student).await.unwrap();
    student
}

/// Holds the first `parties` attendance reads until all of them have
/// arrived, so concurrent callers all read before any of them writes.
pub(crate) struct GatedStore {
    inner: MemoryDocumentStore,
    remaining: AtomicUsize,
    gate: Barrier,
}

impl GatedStore {
    pub(crate) fn new(parties: usize) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            remaining: AtomicUsize::new(parties),
            gate: Barrier::new(parties),
        }
    }

    async fn hold(&self, collection: Collection) {
        if collection != Collection::Attendance {
            return;
        }
        let gated = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if gated {
            self.gate.wait().await;
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn find(&self, c: Collection, f: &Filter) -> StoreResult<Vec<Document>> {
        self.hold(c).await;
        self.inner.find(c, f).await
    }

    async fn get(&self, c: Collection, id: &str) -> StoreResult<Option<Document>> {
        self.hold(c).await;
        self.inner.get(c, id).await
    }

    async fn create(&self, c: Collection, fields: Fields) -> StoreResult<String> {
        self.inner.create(c, fields).await
    }

    async fn insert(&self, c: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        self.inner.insert(c, id, fields).await
    }

    async fn update(&self, c: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        self.inner.update(c, id, fields).await
    }

    async fn delete(&self, c: Collection, id: &str) -> StoreResult<()> {
        self.inner.delete(c, id).await
    }

    fn subscribe(&self, c: Collection, f: Filter) -> Subscription {
        self.inner.subscribe(c, f)
    }
}
