//! Attendance API endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use document_store::DocumentStore;
use rpc_protocol::{requests::*, responses::*, ScanResult};

use super::convert::{to_rpc_day, to_rpc_failed, to_rpc_scan, to_rpc_student_ref};
use crate::error::ServerResult;
use crate::state::AppState;

/// Records a QR scan.
///
/// Every outcome is returned as a body; only storage failures change the
/// status, so clients can retry them.
pub async fn scan<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ScanRequest>,
) -> (StatusCode, Json<ScanResponse>) {
    let outcome = state
        .recorder
        .record_scan(&request.raw_code, &request.course_id, Utc::now())
        .await;

    let result = to_rpc_scan(outcome);
    let status = match result {
        ScanResult::StorageError { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(result))
}

/// Marks everyone not scanned on a day as absent.
pub async fn finalize_session<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<FinalizeSessionRequest>,
) -> ServerResult<Json<FinalizeSessionResponse>> {
    let date = match request.date {
        Some(date) => date,
        None => {
            let course = state.repo.get_course(&request.course_id).await?;
            state.zones.local_date(course.as_ref(), Utc::now())
        }
    };

    let summary = state
        .finalizer
        .finalize_session(&request.course_id, date)
        .await?;

    let complete = summary.is_complete();
    Ok(Json(FinalizeSessionResponse {
        course_id: summary.course_id,
        date: summary.date,
        absences_created: summary.absences_created,
        already_decided: summary.already_decided,
        failed: summary.failed.into_iter().map(to_rpc_failed).collect(),
        complete,
    }))
}

/// Lists session days of a course, newest first.
pub async fn session_history<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<SessionHistoryRequest>,
) -> ServerResult<Json<SessionHistoryResponse>> {
    let days = state.history.session_days(&request.course_id).await?;
    Ok(Json(SessionHistoryResponse {
        days: days.into_iter().map(to_rpc_day).collect(),
    }))
}

/// Gets who attended on one day.
pub async fn day_detail<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<DayDetailRequest>,
) -> ServerResult<Json<DayDetailResponse>> {
    let detail = state
        .history
        .day_detail(&request.course_id, request.date)
        .await?;

    Ok(Json(DayDetailResponse {
        course_id: detail.course_id,
        date: detail.date,
        present: detail.present.into_iter().map(to_rpc_student_ref).collect(),
        absent: detail.absent.into_iter().map(to_rpc_student_ref).collect(),
        unrecorded: detail.unrecorded.into_iter().map(to_rpc_student_ref).collect(),
    }))
}

/// Fills in missing dates of a course's entries.
pub async fn correct_dates<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<CorrectDatesRequest>,
) -> ServerResult<Json<CorrectDatesResponse>> {
    state.roster.get_course(&request.course_id).await?;
    let corrected = state.corrector.backfill(&request.course_id).await?;
    Ok(Json(CorrectDatesResponse { corrected }))
}
