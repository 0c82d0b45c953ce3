//! Periodic flush of tick-driven state changes

use std::{sync::Arc, time::Duration};

use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::state::TimerRegistry;

/// Background task that writes pending tick changes every `period`
pub async fn autosave_task(registry: Arc<TimerRegistry>, period: Duration) {
    info!("Starting autosave task (every {}s)", period.as_secs());

    let mut interval = interval(period);
    interval.tick().await;

    loop {
        interval.tick().await;

        match registry.flush() {
            Ok(true) => debug!("Autosaved timer state"),
            Ok(false) => {}
            Err(e) => warn!("Autosave failed, will retry: {}", e),
        }
    }
}
