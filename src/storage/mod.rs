//! Durable key-value storage
//!
//! State is stored as string blobs under fixed keys. The gateway owns the
//! encoding; stores only move bytes.

pub mod file;
pub mod gateway;
pub mod memory;

use std::fmt::Debug;

use crate::error::PersistenceFailure;

pub use file::FileStore;
pub use gateway::{PersistenceGateway, Restored};
pub use memory::MemoryStore;

/// Key holding the serialized driver array
pub const DRIVERS_KEY: &str = "batteryControl_drivers";
/// Key holding the serialized settings
pub const SETTINGS_KEY: &str = "batteryControl_settings";
/// Key holding the settings panel collapsed flag
pub const PANEL_COLLAPSED_KEY: &str = "batteryControl_settingsCollapsed";

/// String-keyed blob storage. Last writer wins.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a key; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> std::io::Result<Option<String>>;

    /// Overwrite a key.
    ///
    /// Called synchronously from async handlers and the autosave task, with
    /// the registry lock or the settings write guard held. Implementations
    /// should be local and fast; a remote store belongs behind
    /// `spawn_blocking` or a write queue.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceFailure>;
}
