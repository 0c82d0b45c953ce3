//! Timer notifications
//!
//! The registry reports ticks, threshold alerts and expiries through
//! [`NotificationPort`]. Rendering and audio live on the other side of it.

pub mod broadcast;

use serde::{Deserialize, Serialize};

use crate::state::Tier;

pub use broadcast::BroadcastNotifier;

/// Receiver of timer events.
///
/// Called while the registry lock is held, so implementations must return
/// quickly and must not call back into the registry. The same lock also
/// covers the synchronous driver write of each mutating operation, which
/// runs on the calling async worker thread.
pub trait NotificationPort: Send + Sync {
    /// Fired once per scheduler cycle for every ticking timer, paused or not
    fn on_tick(&self, id: &str, remaining_seconds: u64, tier: Tier, is_paused: bool);

    /// Fired when a countdown lands exactly on the critical threshold
    fn on_threshold_alert(&self, id: &str);

    /// Fired once when a countdown reaches zero
    fn on_expired(&self, id: &str);
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationPort for NoopNotifier {
    fn on_tick(&self, _id: &str, _remaining_seconds: u64, _tier: Tier, _is_paused: bool) {}
    fn on_threshold_alert(&self, _id: &str) {}
    fn on_expired(&self, _id: &str) {}
}

/// Event payload as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    #[serde(rename_all = "camelCase")]
    Tick {
        id: String,
        remaining_seconds: u64,
        display: String,
        tier: Tier,
        is_paused: bool,
    },
    ThresholdAlert {
        id: String,
    },
    Expired {
        id: String,
    },
}

impl TimerEvent {
    pub fn id(&self) -> &str {
        match self {
            TimerEvent::Tick { id, .. }
            | TimerEvent::ThresholdAlert { id }
            | TimerEvent::Expired { id } => id,
        }
    }

    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            TimerEvent::Tick { .. } => "tick",
            TimerEvent::ThresholdAlert { .. } => "thresholdAlert",
            TimerEvent::Expired { .. } => "expired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_serializes_with_type_tag() {
        let event = TimerEvent::Tick {
            id: "7".to_string(),
            remaining_seconds: 1800,
            display: "00:30:00".to_string(),
            tier: Tier::Critical,
            is_paused: false,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "tick");
        assert_eq!(value["remainingSeconds"], 1800);
        assert_eq!(value["tier"], "CRITICAL");
        assert_eq!(event.id(), "7");
    }

    #[test]
    fn alert_and_expiry_tags() {
        let alert = serde_json::to_value(TimerEvent::ThresholdAlert { id: "1".into() }).unwrap();
        let expired = serde_json::to_value(TimerEvent::Expired { id: "1".into() }).unwrap();
        assert_eq!(alert["type"], "thresholdAlert");
        assert_eq!(expired["type"], "expired");
    }
}
