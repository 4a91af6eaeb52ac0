//! Route table.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{admin, license};
use crate::api::state::AppState;

/// Build the HTTP router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(license::home))
        .route("/api/license", get(license::verify))
        .route("/api/admin/create", post(admin::create_license))
        .route("/api/admin/ban", post(admin::ban))
        .route("/api/admin/list", get(admin::list))
        .route("/api/admin/reset", post(admin::reset))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
