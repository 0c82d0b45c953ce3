//! Background tasks module
//!
//! Tasks that run alongside the HTTP server: the countdown scheduler and the
//! autosave loop.

pub mod autosave;
pub mod ticker;

// Re-export main functions
pub use autosave::autosave_task;
pub use ticker::{ticker_task, TICK_PERIOD};
