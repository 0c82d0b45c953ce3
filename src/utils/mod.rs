//! Utility functions module
//!
//! Signal handling and time formatting helpers used throughout the application.

pub mod signals;
pub mod time;

// Re-export main functions
pub use signals::shutdown_signal;
pub use time::{format_hms, format_uptime};
