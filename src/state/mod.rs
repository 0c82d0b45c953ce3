//! State management module
//!
//! Driver records, settings, urgency tiers, the timer registry and the
//! shared application state handed to the HTTP layer and background tasks.

pub mod app_state;
pub mod driver;
pub mod registry;
pub mod settings;
pub mod tier;

// Re-export main types
pub use app_state::AppState;
pub use driver::DriverTimer;
pub use registry::{Applied, RegistryStats, TimerRegistry};
pub use settings::{Settings, SettingsStore};
pub use tier::{Tier, TierStyle, PAUSED_LABEL};
