//! Application state.

use std::sync::Arc;

use attendance::{
    AttendanceHistory, AttendanceRecorder, AttendanceRepository, DateCorrector,
    MonthlyReportBuilder, RosterService, SessionFinalizer, ZonePolicy,
};
use document_store::DocumentStore;

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: DocumentStore> {
    /// Server configuration.
    pub config: Config,
    /// Zone used to turn instants into course days.
    pub zones: ZonePolicy,
    /// Typed access to the document store.
    pub repo: AttendanceRepository<S>,
    pub roster: RosterService<S>,
    pub recorder: AttendanceRecorder<S>,
    pub finalizer: SessionFinalizer<S>,
    pub history: AttendanceHistory<S>,
    pub reports: MonthlyReportBuilder<S>,
    pub corrector: DateCorrector<S>,
}

impl<S: DocumentStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, zones: ZonePolicy, store: Arc<S>) -> Self {
        let repo = AttendanceRepository::new(store);
        Self {
            config,
            zones,
            roster: RosterService::new(repo.clone()),
            recorder: AttendanceRecorder::new(repo.clone(), zones),
            finalizer: SessionFinalizer::new(repo.clone()),
            history: AttendanceHistory::new(repo.clone()),
            reports: MonthlyReportBuilder::new(repo.clone()),
            corrector: DateCorrector::new(repo.clone(), zones),
            repo,
        }
    }

    /// Returns the document store.
    pub fn store(&self) -> &Arc<S> {
        self.repo.store()
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;

/// Creates shared state from config and store.
pub fn create_shared_state<S: DocumentStore>(
    config: Config,
    zones: ZonePolicy,
    store: Arc<S>,
) -> SharedState<S> {
    Arc::new(AppState::new(config, zones, store))
}
