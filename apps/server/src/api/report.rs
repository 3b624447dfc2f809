//! Monthly report API endpoints.

use std::sync::Arc;

use attendance::{csv_file_name, to_csv, ReportMatrix};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use document_store::DocumentStore;
use entities::YearMonth;
use rpc_protocol::{requests::*, responses::*};

use super::convert::to_rpc_report;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

async fn build<S: DocumentStore>(
    state: &AppState<S>,
    request: &MonthlyReportRequest,
) -> ServerResult<ReportMatrix> {
    let year_month: YearMonth = request
        .year_month
        .parse()
        .map_err(|e| ServerError::InvalidRequest(format!("{}", e)))?;

    Ok(state
        .reports
        .build_monthly_matrix(&request.course_id, year_month)
        .await?)
}

/// Builds the attendance grid of one month.
pub async fn monthly_report<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<MonthlyReportRequest>,
) -> ServerResult<Json<MonthlyReportResponse>> {
    let matrix = build(&state, &request).await?;
    Ok(Json(MonthlyReportResponse {
        report: to_rpc_report(matrix),
    }))
}

/// Builds the grid of one month as a CSV download.
pub async fn monthly_csv<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<MonthlyReportRequest>,
) -> ServerResult<Response> {
    let matrix = build(&state, &request).await?;
    let disposition = format!("attachment; filename=\"{}\"", csv_file_name(&matrix));

    tracing::info!(
        course_id = %request.course_id,
        year_month = %request.year_month,
        rows = matrix.rows.len(),
        "Exported monthly report"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        to_csv(&matrix),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_monthly_report_and_csv() {
        let app = app();
        let course_id = seed(&app).await;
        post(
            &app,
            "/api/attendance/finalize",
            json!({ "course_id": course_id, "date": "2024-11-05" }),
        )
        .await;

        let (status, body) = post(
            &app,
            "/api/report/monthly",
            json!({ "course_id": course_id, "year_month": "2024-11" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = &body["report"];
        assert_eq!(report["days"].as_array().unwrap().len(), 30);
        assert_eq!(report["rows"][0]["student_name"], "Ana");
        assert_eq!(report["rows"][0]["marks"][4], "A");
        assert_eq!(report["rows"][0]["marks"][5], "-");
        assert_eq!(report["rows"][0]["absent_count"], 1);

        let (status, bytes) = post_raw(
            &app,
            "/api/report/csv",
            json!({ "course_id": course_id, "year_month": "2024-11" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let csv = String::from_utf8(bytes).unwrap();
        assert!(csv.starts_with("No.,Student,2024-11-01,"));
        assert!(csv.contains("\"Ana\""));
    }

    #[tokio::test]
    async fn test_bad_month_is_rejected() {
        let app = app();
        let course_id = seed(&app).await;
        let (status, body) = post(
            &app,
            "/api/report/monthly",
            json!({ "course_id": course_id, "year_month": "November" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }
}
