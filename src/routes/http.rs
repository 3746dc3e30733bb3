// GET handlers: version, api/v1/results

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use super::AppState;
use crate::models::QueryResult;
use crate::results_repo::aggregation::{assemble, select_bucket_width};
use crate::version::{NAME, VERSION};

/// Default desired point count when `target` is missing or unparseable.
const DEFAULT_TARGET_POINTS: NonZeroU32 = NonZeroU32::new(400).unwrap();

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// Raw query strings: a bad value falls back to its default instead of
/// rejecting the request.
#[derive(Debug, Deserialize)]
pub(super) struct ResultsParams {
    start: Option<String>,
    end: Option<String>,
    target: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ResultsResponse {
    results: QueryResult,
}

/// GET /api/v1/results?start=&end=&target= — downsampled aggregation over
/// [start, end]. start/end are epoch seconds, each defaulting to now;
/// target is the desired point count, defaulting to 400.
pub(super) async fn results_handler(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> Result<axum::Json<ResultsResponse>, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let start = parse_or(params.start, now);
    let end = parse_or(params.end, now);
    let target_points = params
        .target
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(NonZeroU32::new)
        .unwrap_or(DEFAULT_TARGET_POINTS);

    let width = select_bucket_width(start, end, target_points);
    tracing::debug!(
        start,
        end,
        target_points = target_points.get(),
        bin_secs = width.as_secs(),
        "results query"
    );

    let rows = state
        .results_repo
        .aggregate(start, end, &width, None)
        .await
        .map_err(ApiError::StoreUnavailable)?;

    Ok(axum::Json(ResultsResponse {
        results: assemble(rows),
    }))
}

fn parse_or(value: Option<String>, default: i64) -> i64 {
    value.and_then(|s| s.parse::<i64>().ok()).unwrap_or(default)
}

/// Query-path failures surfaced to the client. Parameter problems never get
/// here (they default field by field); only the store call can fail.
#[derive(Debug, thiserror::Error)]
pub(super) enum ApiError {
    #[error("results store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "results query failed");
        let body = axum::Json(serde_json::json!({
            "error": "results store unavailable",
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
