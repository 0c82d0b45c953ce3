//! Charge Countdown - A state-managed HTTP server for battery-swap timers
//!
//! This library tracks one countdown per registered driver, classifies the
//! remaining time into urgency tiers, and persists timers and settings so
//! they survive restarts.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{PersistenceFailure, TimerError};
pub use notify::{NotificationPort, TimerEvent};
pub use state::{AppState, DriverTimer, Settings, Tier, TimerRegistry};
pub use utils::signals::shutdown_signal;
