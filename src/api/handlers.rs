//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::responses::{
    ApiError, ApiResponse, CreateDriverRequest, DriverView, ExtendRequest, HealthResponse,
    PanelState, StatusResponse,
};
use crate::state::{AppState, Settings};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn view(state: &AppState, driver: crate::state::DriverTimer) -> DriverView {
    DriverView::new(driver, &state.settings.get())
}

/// Handle GET /drivers - List every driver in creation order
pub async fn list_drivers_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<DriverView>>> {
    let settings = state.settings.get();
    let views: Vec<DriverView> = state
        .registry
        .list()
        .into_iter()
        .map(|driver| DriverView::new(driver, &settings))
        .collect();

    Json(ApiResponse::ok(format!("{} drivers", views.len()), views))
}

/// Handle POST /drivers - Register a driver and start its countdown
pub async fn create_driver_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDriverRequest>,
) -> ApiResult<DriverView> {
    let duration = state
        .settings
        .get()
        .resolve_duration(request.hours, request.minutes);
    let batteries = request.batteries.unwrap_or(1);

    let applied = state.registry.create(&request.name, batteries, duration)?;
    state.record_action("create");

    let applied = applied.map(|driver| view(&state, driver));
    Ok(Json(ApiResponse::applied("Driver added", applied)))
}

/// Handle GET /drivers/:id
pub async fn get_driver_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let driver = state.registry.get(&id)?;
    Ok(Json(ApiResponse::ok("Driver found", view(&state, driver))))
}

/// Handle DELETE /drivers/:id - Stop and remove one driver
pub async fn remove_driver_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let applied = state.registry.remove(&id)?;
    state.record_action("remove");

    let applied = applied.map(|driver| view(&state, driver));
    Ok(Json(ApiResponse::applied("Driver removed", applied)))
}

/// Handle DELETE /drivers - Stop and remove every driver
pub async fn clear_drivers_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse<usize>> {
    let applied = state.registry.clear_all();
    state.record_action("clear-all");
    Json(ApiResponse::applied("All drivers removed", applied))
}

/// Handle POST /drivers/:id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let applied = state.registry.pause(&id)?;
    state.record_action("pause");
    Ok(Json(ApiResponse::applied("Timer paused", applied.map(|d| view(&state, d)))))
}

/// Handle POST /drivers/:id/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let applied = state.registry.resume(&id)?;
    state.record_action("resume");
    Ok(Json(ApiResponse::applied("Timer resumed", applied.map(|d| view(&state, d)))))
}

/// Handle POST /drivers/:id/toggle-pause
pub async fn toggle_pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let applied = state.registry.toggle_pause(&id)?;
    state.record_action("toggle-pause");

    let message = if applied.value.is_paused { "Timer paused" } else { "Timer resumed" };
    Ok(Json(ApiResponse::applied(message, applied.map(|d| view(&state, d)))))
}

/// Handle POST /drivers/:id/reset
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<DriverView> {
    let applied = state.registry.reset(&id)?;
    state.record_action("reset");
    Ok(Json(ApiResponse::applied("Timer reset", applied.map(|d| view(&state, d)))))
}

/// Handle POST /drivers/:id/extend - Add minutes to a timer
pub async fn extend_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ExtendRequest>,
) -> ApiResult<DriverView> {
    let applied = state.registry.extend(&id, request.minutes)?;
    state.record_action("extend");

    let message = format!("Added {} minutes", request.minutes);
    Ok(Json(ApiResponse::applied(message, applied.map(|d| view(&state, d)))))
}

/// Handle GET /settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Settings>> {
    Json(ApiResponse::ok("Current settings", state.settings.get()))
}

/// Handle PUT /settings - Replace the settings
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Json<ApiResponse<Settings>> {
    state.record_action("settings");
    let response = match state.settings.update(settings) {
        Ok(settings) => ApiResponse::ok("Settings saved", settings),
        Err(e) => ApiResponse::ok("Settings applied", settings).with_persistence(Some(e)),
    };
    Json(response)
}

/// Handle GET /ui/settings-collapsed
pub async fn get_panel_handler(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<PanelState>> {
    let panel = PanelState {
        collapsed: state.panel_collapsed(),
    };
    Json(ApiResponse::ok("Panel state", panel))
}

/// Handle PUT /ui/settings-collapsed
pub async fn set_panel_handler(
    State(state): State<Arc<AppState>>,
    Json(panel): Json<PanelState>,
) -> Json<ApiResponse<PanelState>> {
    let failure = state.set_panel_collapsed(panel.collapsed).err();
    Json(ApiResponse::ok("Panel state saved", panel).with_persistence(failure))
}

/// Handle GET /status - Return counters, settings and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        stats: state.registry.stats(),
        settings: state.settings.get(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream timer events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Event subscriber connected");
    let rx = state.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), rx)),
                    Err(e) => warn!("Failed to encode event for {}: {}", event.id(), e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
