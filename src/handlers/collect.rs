use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::formatter::{json::CollectionReportJson, JsonFormatter};
use crate::routes::router::AppState;

/// Runs one collection pass and returns the report.
///
/// Only a fatal error (secret or directory unavailable) turns into a 503;
/// per-target failures are part of the report.
pub async fn collect(
    State(state): State<AppState>,
) -> Result<Json<CollectionReportJson>, (StatusCode, Json<Value>)> {
    let cancel = state.shutdown.child_token();

    match state.collector.collect_all(cancel).await {
        Ok(report) => Ok(Json(JsonFormatter::format_report(&report))),
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "collection pass aborted");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.kind(), "message": e.to_string() })),
            ))
        }
    }
}
