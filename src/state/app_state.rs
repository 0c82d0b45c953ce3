//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{SettingsStore, TimerRegistry};
use crate::{
    error::PersistenceFailure,
    notify::{BroadcastNotifier, TimerEvent},
    storage::{KeyValueStore, PersistenceGateway},
    utils::format_uptime,
};

/// Capacity of the event channel; slow SSE clients skip ahead when lagging
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Shared state behind the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// Driver timers
    pub registry: Arc<TimerRegistry>,
    /// Live settings, persisted on change
    pub settings: Arc<SettingsStore>,
    pub gateway: Arc<PersistenceGateway>,
    /// Event fan-out for SSE subscribers
    pub notifier: BroadcastNotifier,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Build the application state from whatever the store holds
    pub fn open(store: Arc<dyn KeyValueStore>, port: u16, host: String) -> Self {
        let gateway = Arc::new(PersistenceGateway::new(store));
        let restored = gateway.load();

        let settings = Arc::new(SettingsStore::new(restored.settings, Arc::clone(&gateway)));
        let notifier = BroadcastNotifier::new(EVENT_CHANNEL_CAPACITY);
        let registry = Arc::new(TimerRegistry::new(
            Arc::clone(&settings),
            Arc::clone(&gateway),
            Arc::new(notifier.clone()),
        ));
        registry.restore(restored.drivers);

        Self {
            registry,
            settings,
            gateway,
            notifier,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.notifier.subscribe()
    }

    /// Record the last action taken through the API
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    pub fn panel_collapsed(&self) -> bool {
        self.gateway.load_panel_collapsed()
    }

    pub fn set_panel_collapsed(&self, collapsed: bool) -> Result<(), PersistenceFailure> {
        info!("Settings panel collapsed: {}", collapsed);
        self.gateway.save_panel_collapsed(collapsed)
    }

    /// Write any pending tick changes, used on shutdown
    pub fn flush(&self) {
        match self.registry.flush() {
            Ok(true) => info!("Pending timer state flushed"),
            Ok(false) => {}
            Err(e) => warn!("Final flush failed: {}", e),
        }
    }
}
