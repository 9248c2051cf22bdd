use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{handlers, scans, status, tickets, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes behind the configured authenticator
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        // Scan dispatch
        .route("/scans", post(scans::submit_scan))
        .route("/scans/failures", post(scans::report_failure))
        // Display and device state
        .route("/status", get(status::get_status))
        .route("/settings", get(status::get_settings))
        // Pass lookup
        .route("/tickets/{id}", get(tickets::get_ticket))
        // Live status stream
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
