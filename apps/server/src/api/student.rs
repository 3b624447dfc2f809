//! Student roster API endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use document_store::DocumentStore;
use rpc_protocol::{requests::*, responses::*};

use super::convert::to_rpc_student;
use crate::error::ServerResult;
use crate::state::AppState;

/// Adds a student to a course.
pub async fn add_student<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<AddStudentRequest>,
) -> ServerResult<Json<AddStudentResponse>> {
    let student = state
        .roster
        .add_student(&request.course_id, &request.student_id, &request.name)
        .await?;

    Ok(Json(AddStudentResponse {
        student: to_rpc_student(student),
    }))
}

/// Lists a course's students ordered by name.
pub async fn list_students<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ListStudentsRequest>,
) -> ServerResult<Json<ListStudentsResponse>> {
    let students = state.roster.list_students(&request.course_id).await?;
    Ok(Json(ListStudentsResponse {
        students: students.into_iter().map(to_rpc_student).collect(),
    }))
}

/// Removes a student and their attendance.
pub async fn remove_student<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<RemoveStudentRequest>,
) -> ServerResult<Json<RemoveStudentResponse>> {
    let summary = state.roster.remove_student(&request.student_id).await?;
    Ok(Json(RemoveStudentResponse {
        entries_removed: summary.entries_removed,
        failed: summary.failed,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_roster_endpoints() {
        let app = app();
        let course_id = seed(&app).await;

        let (status, body) = post(
            &app,
            "/api/student/add",
            json!({ "course_id": course_id, "student_id": "s1", "name": "Otra Ana" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (_, body) = post(&app, "/api/student/list", json!({ "course_id": course_id })).await;
        let names: Vec<&str> = body["students"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Ana", "Beto"]);

        let (status, _) = post(&app, "/api/student/remove", json!({ "student_id": "s2" })).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post(&app, "/api/student/remove", json!({ "student_id": "s2" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
