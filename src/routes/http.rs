// GET handlers: version, latest stats, historical stats

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::history::{HistoryError, query_history};
use crate::models::{HistoricalStats, Snapshot};

/// Handler failures. Rendered as 500 with `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub(super) enum ApiError {
    #[error("failed to retrieve stats: {0}")]
    Sample(anyhow::Error),
    #[error("failed to retrieve historical stats: {0}")]
    History(#[from] HistoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/stats: samples now. Shares the network baseline with the collect tick.
pub(super) async fn latest_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state
        .sysinfo_repo
        .sample(&state.baseline)
        .await
        .map_err(ApiError::Sample)?;
    Ok(Json(snapshot))
}

/// First `period` value in the query string; repeats are ignored and a missing key is "".
fn first_period(params: &[(String, String)]) -> &str {
    params
        .iter()
        .find(|(key, _)| key == "period")
        .map_or("", |(_, value)| value.as_str())
}

/// GET /api/stats/historical?period=hour|sixHrs|day|week|fortnight
/// Missing or unknown period returns everything retained.
pub(super) async fn historical_stats_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<HistoricalStats>, ApiError> {
    let period = first_period(&params);
    let stats = query_history(&state.history_repo, period, chrono::Utc::now()).await?;
    Ok(Json(stats))
}
