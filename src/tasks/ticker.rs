//! Countdown scheduler background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::TimerRegistry;

/// Period between countdown steps
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drive every ticking timer once per second.
///
/// One loop serves all drivers. Missed periods are not replayed.
pub async fn ticker_task(registry: Arc<TimerRegistry>) {
    info!("Starting countdown scheduler");

    let mut interval = interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        registry.tick();
    }
}
