//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PersistenceFailure, TimerError},
    state::{Applied, DriverTimer, RegistryStats, Settings, Tier, PAUSED_LABEL},
    utils::format_hms,
};

/// Envelope for every successful call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
    /// Set when the change succeeded but could not be written to storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_warning: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            data,
            persistence_warning: None,
        }
    }

    pub fn with_persistence(mut self, failure: Option<PersistenceFailure>) -> Self {
        self.persistence_warning = failure.map(|e| e.to_string());
        self
    }

    /// Wrap an applied mutation, carrying over any write failure
    pub fn applied(message: impl Into<String>, applied: Applied<T>) -> Self {
        Self::ok(message, applied.value).with_persistence(applied.persistence)
    }
}

/// A driver as the UI renders it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverView {
    #[serde(flatten)]
    pub driver: DriverTimer,
    pub display: String,
    pub tier: Tier,
    pub status_label: String,
    pub card_class: String,
    pub status_class: String,
}

impl DriverView {
    pub fn new(driver: DriverTimer, settings: &Settings) -> Self {
        let tier = driver.tier(
            settings.warning_threshold_minutes,
            settings.critical_threshold_minutes,
        );
        let style = tier.style();
        let status_label = if driver.is_paused { PAUSED_LABEL } else { style.label };

        Self {
            display: format_hms(driver.remaining_seconds),
            tier,
            status_label: status_label.to_string(),
            card_class: style.card_class.to_string(),
            status_class: style.status_class.to_string(),
            driver,
        }
    }
}

/// Body of `POST /drivers`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDriverRequest {
    #[serde(default)]
    pub name: String,
    pub batteries: Option<u32>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
}

/// Body of `POST /drivers/:id/extend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub minutes: u64,
}

/// Body and response of `/ui/settings-collapsed`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PanelState {
    pub collapsed: bool,
}

/// Response of `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub stats: RegistryStats,
    pub settings: Settings,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Registry errors mapped onto HTTP statuses
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(err: TimerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            TimerError::InvalidDuration => (StatusCode::BAD_REQUEST, "InvalidDuration"),
            TimerError::UnknownTimer(_) => (StatusCode::NOT_FOUND, "UnknownTimer"),
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            error: kind.to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
