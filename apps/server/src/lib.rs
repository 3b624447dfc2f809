//! Rollcall Server
//!
//! HTTP front end for QR attendance: course and roster management, scan
//! check-ins, session finalization, history and monthly reports, plus a
//! live event stream of attendance changes per course.

pub mod api;
pub mod config;
pub mod error;
pub mod sse;
pub mod state;

use std::sync::Arc;

use attendance::ZonePolicy;
use axum::Router;
use document_store::DocumentStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{create_shared_state, AppState};

/// Creates the application router with all routes configured.
pub fn create_app<S: DocumentStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: DocumentStore>(
    config: Config,
    store: Arc<S>,
) -> anyhow::Result<Arc<AppState<S>>> {
    let zones = ZonePolicy::from_name(&config.time_zone)?;
    Ok(create_shared_state(config, zones, store))
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
