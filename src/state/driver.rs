//! Driver timer record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Tier;

/// One registered driver and its countdown
///
/// `name` is user text and is carried verbatim; consumers must render it as
/// literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverTimer {
    pub id: String,
    pub name: String,
    pub batteries: u32,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub is_paused: bool,
    pub created_at: DateTime<Utc>,
}

impl DriverTimer {
    /// Create a running timer with a full countdown
    pub fn new(id: String, name: String, batteries: u32, total_seconds: u64) -> Self {
        Self {
            id,
            name,
            batteries,
            total_seconds,
            remaining_seconds: total_seconds,
            is_paused: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    pub fn tier(&self, warning_minutes: u64, critical_minutes: u64) -> Tier {
        Tier::classify(self.remaining_seconds, warning_minutes, critical_minutes)
    }

    /// Decrement by one second unless paused or already at zero.
    ///
    /// Returns whether the countdown moved.
    pub fn tick_down(&mut self) -> bool {
        if self.is_paused || self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.remaining_seconds = self.total_seconds;
        self.is_paused = false;
    }

    pub fn extend(&mut self, extra_seconds: u64) {
        self.remaining_seconds = self.remaining_seconds.saturating_add(extra_seconds);
        self.total_seconds = self.total_seconds.saturating_add(extra_seconds);
    }
}
