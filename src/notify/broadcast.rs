//! Broadcast channel fan-out of timer events

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{NotificationPort, TimerEvent};
use crate::{state::Tier, utils::format_hms};

/// Publishes every event on a broadcast channel and logs alerts and expiries
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<TimerEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.tx.subscribe()
    }

    fn publish(&self, event: TimerEvent) {
        // No subscribers is the normal idle case
        if self.tx.send(event).is_err() {
            debug!("No event subscribers connected");
        }
    }
}

impl NotificationPort for BroadcastNotifier {
    fn on_tick(&self, id: &str, remaining_seconds: u64, tier: Tier, is_paused: bool) {
        self.publish(TimerEvent::Tick {
            id: id.to_string(),
            remaining_seconds,
            display: format_hms(remaining_seconds),
            tier,
            is_paused,
        });
    }

    fn on_threshold_alert(&self, id: &str) {
        warn!("Driver {} reached the critical threshold", id);
        self.publish(TimerEvent::ThresholdAlert { id: id.to_string() });
    }

    fn on_expired(&self, id: &str) {
        info!("Driver {} timer expired", id);
        self.publish(TimerEvent::Expired { id: id.to_string() });
    }
}
