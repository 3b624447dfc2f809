//! API endpoints.

pub mod attendance;
pub mod convert;
pub mod course;
pub mod report;
pub mod student;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use document_store::DocumentStore;

use crate::{sse, state::AppState};

/// Creates the API router with all endpoints.
pub fn create_router<S: DocumentStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Course endpoints
        .route("/api/course/create", post(course::create_course))
        .route("/api/course/list", post(course::list_courses))
        .route("/api/course/get", post(course::get_course))
        .route("/api/course/update", post(course::update_course))
        .route("/api/course/delete", post(course::delete_course))
        // Student endpoints
        .route("/api/student/add", post(student::add_student))
        .route("/api/student/list", post(student::list_students))
        .route("/api/student/remove", post(student::remove_student))
        // Attendance endpoints
        .route("/api/attendance/scan", post(attendance::scan))
        .route("/api/attendance/finalize", post(attendance::finalize_session))
        .route("/api/attendance/history", post(attendance::session_history))
        .route("/api/attendance/day", post(attendance::day_detail))
        .route("/api/attendance/correct-dates", post(attendance::correct_dates))
        // Report endpoints
        .route("/api/report/monthly", post(report::monthly_report))
        .route("/api/report/csv", post(report::monthly_csv))
        // Live attendance changes
        .route("/events/attendance/{course_id}", get(sse::handle_sse))
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
