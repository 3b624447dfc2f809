//! Server-Sent Events (SSE) feed of attendance changes
//!
//! Clients watching a course (the scanning screen, the history screen) get
//! one event per created, updated or deleted attendance entry of that course.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use document_store::{ChangeEvent, ChangeKind, Collection, DocumentStore, Filter};
use entities::AttendanceEntry;
use rpc_protocol::AttendanceChangeNotification;
use tracing::{debug, info, warn};

use crate::api::convert::to_rpc_entry;
use crate::state::AppState;

fn to_notification(course_id: &str, event: ChangeEvent) -> AttendanceChangeNotification {
    let kind = match event.kind {
        ChangeKind::Created => rpc_protocol::ChangeKind::Created,
        ChangeKind::Updated => rpc_protocol::ChangeKind::Updated,
        ChangeKind::Deleted => rpc_protocol::ChangeKind::Deleted,
    };
    // Undated entries do not decode until the date is filled in
    let entry = event
        .document
        .decode::<AttendanceEntry>()
        .ok()
        .map(to_rpc_entry);

    AttendanceChangeNotification {
        course_id: course_id.to_string(),
        kind,
        entry_id: event.document.id,
        entry,
    }
}

/// SSE endpoint for subscribing to a course's attendance changes
///
/// GET /events/attendance/{course_id}
pub async fn handle_sse<S: DocumentStore + 'static>(
    Path(course_id): Path<String>,
    State(state): State<Arc<AppState<S>>>,
) -> Response {
    info!(course_id = %course_id, "SSE client connected");

    let mut subscription = state.store().subscribe(
        Collection::Attendance,
        Filter::new().eq("courseId", course_id.as_str()),
    );

    let stream = async_stream::stream! {
        while let Some(event) = subscription.next().await {
            let notification = to_notification(&course_id, event);
            match serde_json::to_string(&notification) {
                Ok(json) => {
                    yield Ok::<_, Infallible>(Event::default().data(json).event("attendance"));
                }
                Err(e) => {
                    warn!("Failed to serialize notification: {}", e);
                }
            }
        }

        debug!(course_id = %course_id, "Attendance stream ended");
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}
