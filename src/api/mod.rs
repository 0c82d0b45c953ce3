//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/drivers",
            get(list_drivers_handler)
                .post(create_driver_handler)
                .delete(clear_drivers_handler),
        )
        .route(
            "/drivers/:id",
            get(get_driver_handler).delete(remove_driver_handler),
        )
        .route("/drivers/:id/pause", post(pause_handler))
        .route("/drivers/:id/resume", post(resume_handler))
        .route("/drivers/:id/toggle-pause", post(toggle_pause_handler))
        .route("/drivers/:id/reset", post(reset_handler))
        .route("/drivers/:id/extend", post(extend_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route(
            "/ui/settings-collapsed",
            get(get_panel_handler).put(set_panel_handler),
        )
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
