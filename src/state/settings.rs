//! Process-wide timer settings

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::PersistenceFailure, storage::PersistenceGateway};

pub const DEFAULT_HOURS: u64 = 5;
pub const DEFAULT_MINUTES: u64 = 0;
pub const DEFAULT_WARNING_MINUTES: u64 = 60;
pub const DEFAULT_CRITICAL_MINUTES: u64 = 30;

/// Default duration and urgency thresholds
///
/// Each field falls back to its own default when missing from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_hours")]
    pub default_hours: u64,
    #[serde(default = "default_minutes")]
    pub default_minutes: u64,
    #[serde(
        rename = "warningThreshold",
        alias = "warningThresholdMinutes",
        default = "default_warning"
    )]
    pub warning_threshold_minutes: u64,
    #[serde(
        rename = "criticalThreshold",
        alias = "criticalThresholdMinutes",
        default = "default_critical"
    )]
    pub critical_threshold_minutes: u64,
}

fn default_hours() -> u64 {
    DEFAULT_HOURS
}

fn default_minutes() -> u64 {
    DEFAULT_MINUTES
}

fn default_warning() -> u64 {
    DEFAULT_WARNING_MINUTES
}

fn default_critical() -> u64 {
    DEFAULT_CRITICAL_MINUTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_hours: DEFAULT_HOURS,
            default_minutes: DEFAULT_MINUTES,
            warning_threshold_minutes: DEFAULT_WARNING_MINUTES,
            critical_threshold_minutes: DEFAULT_CRITICAL_MINUTES,
        }
    }
}

impl Settings {
    pub fn default_duration_seconds(&self) -> u64 {
        to_seconds(self.default_hours, self.default_minutes)
    }

    /// Resolve an optional hours/minutes pair into seconds.
    ///
    /// With neither given the configured default applies; with only one given
    /// the other counts as zero. The result may be zero, which the registry
    /// rejects.
    pub fn resolve_duration(&self, hours: Option<u64>, minutes: Option<u64>) -> u64 {
        match (hours, minutes) {
            (None, None) => self.default_duration_seconds(),
            (hours, minutes) => to_seconds(hours.unwrap_or(0), minutes.unwrap_or(0)),
        }
    }

    pub fn critical_threshold_seconds(&self) -> u64 {
        self.critical_threshold_minutes.saturating_mul(60)
    }
}

fn to_seconds(hours: u64, minutes: u64) -> u64 {
    hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
}

/// Holds the live settings and persists them on every change
#[derive(Debug)]
pub struct SettingsStore {
    data: RwLock<Settings>,
    gateway: Arc<PersistenceGateway>,
}

impl SettingsStore {
    pub fn new(settings: Settings, gateway: Arc<PersistenceGateway>) -> Self {
        Self {
            data: RwLock::new(settings),
            gateway,
        }
    }

    /// Current settings snapshot
    pub fn get(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the settings and write them to storage.
    ///
    /// The write happens under the same guard as the swap, so concurrent
    /// updates reach storage in the order they took effect. The new values
    /// stay in effect even when the write fails.
    pub fn update(&self, settings: Settings) -> Result<Settings, PersistenceFailure> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;

        info!(
            "Settings updated: default={}h{}m, warning={}min, critical={}min",
            settings.default_hours,
            settings.default_minutes,
            settings.warning_threshold_minutes,
            settings.critical_threshold_minutes
        );

        if let Err(e) = self.gateway.save_settings(&settings) {
            warn!("Failed to persist settings: {}", e);
            return Err(e);
        }
        drop(guard);
        Ok(settings)
    }
}
