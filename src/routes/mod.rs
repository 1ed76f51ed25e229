// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::history_repo::HistoryRepo;
use crate::sysinfo_repo::{NetworkBaseline, SysinfoRepo};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sysinfo_repo: Arc<SysinfoRepo>,
    pub(crate) baseline: Arc<NetworkBaseline>,
    pub(crate) history_repo: Arc<HistoryRepo>,
}

pub fn app(
    sysinfo_repo: Arc<SysinfoRepo>,
    baseline: Arc<NetworkBaseline>,
    history_repo: Arc<HistoryRepo>,
) -> Router {
    let state = AppState {
        sysinfo_repo,
        baseline,
        history_repo,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats", get(http::latest_stats_handler)) // GET /api/stats
        .route("/api/stats/historical", get(http::historical_stats_handler)) // GET /api/stats/historical?period=
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
