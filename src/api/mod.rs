//! HTTP surface for approval-routing handlers.

pub mod actions;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::audit::AuditRecorder;

#[derive(Clone)]
pub struct AppState {
    pub recorder: AuditRecorder,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(actions::health_check))
        .route("/audit/actions", post(actions::record_action))
        .route("/audit/entries", get(actions::list_entries))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(state)
}
