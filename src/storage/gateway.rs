//! Encoding and decoding of persisted timer state

use std::{collections::HashSet, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{KeyValueStore, DRIVERS_KEY, PANEL_COLLAPSED_KEY, SETTINGS_KEY};
use crate::{
    error::PersistenceFailure,
    state::{DriverTimer, Settings},
};

/// State read back from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restored {
    pub drivers: Vec<DriverTimer>,
    pub settings: Settings,
}

/// Reads and writes drivers, settings and the panel flag.
///
/// Loading never fails: absent or malformed blobs degrade to empty/default
/// values. Stored `remainingSeconds` values are taken as-is, with no
/// correction for time spent while the process was down.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the stored driver set.
    ///
    /// Settings live under their own key and are written only by
    /// [`SettingsStore`](crate::state::SettingsStore), so a driver write can
    /// never roll back a newer settings blob.
    pub fn save_drivers(&self, drivers: &[DriverTimer]) -> Result<(), PersistenceFailure> {
        self.write(DRIVERS_KEY, drivers)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceFailure> {
        self.write(SETTINGS_KEY, settings)
    }

    pub fn load(&self) -> Restored {
        let drivers = self
            .read::<Vec<DriverTimer>>(DRIVERS_KEY)
            .map(dedupe_ids)
            .unwrap_or_default();
        let settings = self.read::<Settings>(SETTINGS_KEY).unwrap_or_default();

        debug!("Loaded {} drivers from storage", drivers.len());
        Restored { drivers, settings }
    }

    pub fn load_panel_collapsed(&self) -> bool {
        self.read::<bool>(PANEL_COLLAPSED_KEY).unwrap_or(false)
    }

    pub fn save_panel_collapsed(&self, collapsed: bool) -> Result<(), PersistenceFailure> {
        self.write(PANEL_COLLAPSED_KEY, &collapsed)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceFailure> {
        let encoded = serde_json::to_string(value).map_err(|source| PersistenceFailure::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &encoded)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{}', using defaults: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed '{}': {}", key, e);
                None
            }
        }
    }
}

/// Keep the first record for each id
fn dedupe_ids(drivers: Vec<DriverTimer>) -> Vec<DriverTimer> {
    let mut seen = HashSet::new();
    drivers
        .into_iter()
        .filter(|driver| {
            let fresh = seen.insert(driver.id.clone());
            if !fresh {
                warn!("Dropping duplicate stored driver id {}", driver.id);
            }
            fresh
        })
        .collect()
}
