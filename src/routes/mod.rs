// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::AppConfig;
use crate::results_repo::ResultsRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) results_repo: Arc<ResultsRepo>,
    pub(crate) config: AppConfig,
}

pub fn app(results_repo: Arc<ResultsRepo>, config: AppConfig) -> Router {
    let state = AppState {
        results_repo,
        config: config.clone(),
    };
    let mut router = Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/v1/results", get(http::results_handler)); // GET /api/v1/results

    // Chart client build, when configured. Without it the root answers with
    // a plain banner.
    router = match &config.server.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(|| async { "pingwatch" })),
    };

    if config.server.permissive_cors {
        router = router.layer(CorsLayer::new().allow_origin(Any));
    }
    router.with_state(state)
}
