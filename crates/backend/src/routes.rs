use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// All application routes
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // GRID ROUTES (materials, service_orders)
        // ========================================
        .route("/api/grid/:grid/columns", get(handlers::grid::columns))
        .route("/api/grid/:grid/partitions", get(handlers::grid::partitions))
        .route("/api/grid/:grid/data", post(handlers::grid::data))
        .route(
            "/api/grid/:grid/unique_values",
            post(handlers::grid::unique_values),
        )
        .route("/api/grid/:grid/update", post(handlers::grid::update))
        .route("/api/grid/:grid/export", get(handlers::grid::export))
}
