//! Course management API endpoints.

use std::sync::Arc;

use attendance::{CourseChanges, NewCourse};
use axum::{extract::State, Json};
use document_store::DocumentStore;
use rpc_protocol::{requests::*, responses::*};

use super::convert::to_rpc_course;
use crate::error::ServerResult;
use crate::state::AppState;

/// Creates a course.
pub async fn create_course<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<CreateCourseRequest>,
) -> ServerResult<Json<CreateCourseResponse>> {
    let course = state
        .roster
        .create_course(NewCourse {
            name: request.name,
            group_name: request.group_name,
            school_year: request.school_year,
            teacher_id: request.teacher_id,
            time_zone: request.time_zone,
        })
        .await?;

    Ok(Json(CourseResponse {
        course: to_rpc_course(course),
    }))
}

/// Lists courses, optionally only one teacher's.
pub async fn list_courses<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ListCoursesRequest>,
) -> ServerResult<Json<ListCoursesResponse>> {
    let courses = state
        .roster
        .list_courses(request.teacher_id.as_deref())
        .await?;

    Ok(Json(ListCoursesResponse {
        courses: courses.into_iter().map(to_rpc_course).collect(),
    }))
}

/// Gets a course by ID.
pub async fn get_course<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<GetCourseRequest>,
) -> ServerResult<Json<GetCourseResponse>> {
    let course = state.roster.get_course(&request.course_id).await?;
    Ok(Json(CourseResponse {
        course: to_rpc_course(course),
    }))
}

/// Updates a course.
pub async fn update_course<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<UpdateCourseRequest>,
) -> ServerResult<Json<UpdateCourseResponse>> {
    let course = state
        .roster
        .update_course(
            &request.course_id,
            CourseChanges {
                name: request.name,
                group_name: request.group_name,
                school_year: request.school_year,
                time_zone: request.time_zone,
            },
        )
        .await?;

    Ok(Json(CourseResponse {
        course: to_rpc_course(course),
    }))
}

/// Deletes a course with its students and attendance.
pub async fn delete_course<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<DeleteCourseRequest>,
) -> ServerResult<Json<DeleteCourseResponse>> {
    let summary = state.roster.delete_course(&request.course_id).await?;
    Ok(Json(DeleteCourseResponse {
        students_removed: summary.students_removed,
        entries_removed: summary.entries_removed,
        failed: summary.failed,
    }))
}
