//! Timer registry: driver records, their ticking state and every mutation
//!
//! All state lives behind a single mutex. Operations and scheduler ticks run
//! under it, which serializes mutation per id and makes cancellation
//! synchronous: once `remove` or `clear_all` returns, no event for the
//! removed ids can be emitted.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DriverTimer, SettingsStore};
use crate::{
    error::{PersistenceFailure, TimerError},
    notify::NotificationPort,
    storage::PersistenceGateway,
};

/// Result of a mutation that succeeded in memory.
///
/// `persistence` carries the write failure, if any. The mutation is kept
/// either way.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub persistence: Option<PersistenceFailure>,
}

impl<T> Applied<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            value: f(self.value),
            persistence: self.persistence,
        }
    }
}

/// Aggregate counters shown next to the driver list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub active_drivers: usize,
    pub total_batteries: u64,
}

#[derive(Debug, Default)]
struct Inner {
    /// Creation order
    drivers: Vec<DriverTimer>,
    /// Ids with a live ticking process
    ticking: HashSet<String>,
    /// Tick changes not yet written
    dirty: bool,
    next_seq: u64,
}

impl Inner {
    fn position(&self, id: &str) -> Result<usize, TimerError> {
        self.drivers
            .iter()
            .position(|driver| driver.id == id)
            .ok_or_else(|| TimerError::UnknownTimer(id.to_string()))
    }

    /// Millisecond stamp plus a sequence number that never repeats in this
    /// registry, skipping anything already registered
    fn fresh_id(&mut self) -> String {
        loop {
            self.next_seq += 1;
            let id = format!("{}-{}", Utc::now().timestamp_millis(), self.next_seq);
            if !self.drivers.iter().any(|driver| driver.id == id) {
                return id;
            }
        }
    }
}

pub struct TimerRegistry {
    inner: Mutex<Inner>,
    settings: Arc<SettingsStore>,
    gateway: Arc<PersistenceGateway>,
    notifier: Arc<dyn NotificationPort>,
}

impl std::fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("inner", &self.inner)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TimerRegistry {
    /// Create an empty registry
    pub fn new(
        settings: Arc<SettingsStore>,
        gateway: Arc<PersistenceGateway>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            settings,
            gateway,
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Registry lock was poisoned, continuing with last state");
                poisoned.into_inner()
            }
        }
    }

    /// Write the full driver set, clearing the dirty flag on success.
    ///
    /// Runs with the registry lock held and performs a blocking write of a
    /// small blob; stores must stay local and fast.
    fn persist(&self, inner: &mut Inner) -> Option<PersistenceFailure> {
        match self.gateway.save_drivers(&inner.drivers) {
            Ok(()) => {
                inner.dirty = false;
                None
            }
            Err(e) => {
                warn!("Failed to persist timers: {}", e);
                inner.dirty = true;
                Some(e)
            }
        }
    }

    /// Replace the registry contents with previously stored drivers.
    ///
    /// Every driver with time left starts ticking again; expired ones stay
    /// halted. Calling it twice with the same input yields the same state.
    pub fn restore(&self, drivers: Vec<DriverTimer>) -> usize {
        let mut inner = self.lock();
        inner.ticking = drivers
            .iter()
            .filter(|driver| !driver.is_expired())
            .map(|driver| driver.id.clone())
            .collect();
        inner.drivers = drivers;
        inner.dirty = false;

        info!(
            "Restored {} drivers ({} ticking)",
            inner.drivers.len(),
            inner.ticking.len()
        );
        inner.drivers.len()
    }

    /// Register a new driver and start its countdown
    pub fn create(
        &self,
        name: &str,
        batteries: u32,
        duration_seconds: u64,
    ) -> Result<Applied<DriverTimer>, TimerError> {
        if duration_seconds == 0 {
            return Err(TimerError::InvalidDuration);
        }

        let mut inner = self.lock();
        let id = inner.fresh_id();
        let driver = DriverTimer::new(
            id,
            name.trim().to_string(),
            batteries.max(1),
            duration_seconds,
        );

        inner.ticking.insert(driver.id.clone());
        inner.drivers.push(driver.clone());
        info!(
            "Created driver {} ({} batteries, {}s)",
            driver.id, driver.batteries, driver.total_seconds
        );

        let persistence = self.persist(&mut inner);
        Ok(Applied {
            value: driver,
            persistence,
        })
    }

    pub fn pause(&self, id: &str) -> Result<Applied<DriverTimer>, TimerError> {
        self.mutate(id, "pause", |driver| driver.is_paused = true)
    }

    pub fn resume(&self, id: &str) -> Result<Applied<DriverTimer>, TimerError> {
        self.mutate(id, "resume", |driver| driver.is_paused = false)
    }

    pub fn toggle_pause(&self, id: &str) -> Result<Applied<DriverTimer>, TimerError> {
        self.mutate(id, "toggle-pause", |driver| driver.is_paused = !driver.is_paused)
    }

    /// Refill the countdown, clear the pause and restart ticking
    pub fn reset(&self, id: &str) -> Result<Applied<DriverTimer>, TimerError> {
        self.mutate(id, "reset", DriverTimer::reset)
    }

    /// Add minutes to both remaining and total time, reviving expired timers
    pub fn extend(&self, id: &str, extra_minutes: u64) -> Result<Applied<DriverTimer>, TimerError> {
        let extra_seconds = extra_minutes.saturating_mul(60);
        self.mutate(id, "extend", |driver| driver.extend(extra_seconds))
    }

    /// Apply a change, keep the ticking set consistent, then persist
    fn mutate<F>(
        &self,
        id: &str,
        action: &str,
        change: F,
    ) -> Result<Applied<DriverTimer>, TimerError>
    where
        F: FnOnce(&mut DriverTimer),
    {
        let mut inner = self.lock();
        let index = inner.position(id)?;

        let driver = &mut inner.drivers[index];
        change(driver);
        let driver = driver.clone();

        // Only expiry halts a process, so anything with time left ticks
        if !driver.is_expired() && inner.ticking.insert(driver.id.clone()) {
            debug!("Ticking restarted for driver {}", driver.id);
        }

        info!(
            "Driver {} {}: remaining={}s total={}s paused={}",
            driver.id, action, driver.remaining_seconds, driver.total_seconds, driver.is_paused
        );

        let persistence = self.persist(&mut inner);
        Ok(Applied {
            value: driver,
            persistence,
        })
    }

    /// Halt ticking for `id` and delete it. Unknown ids are an error.
    pub fn remove(&self, id: &str) -> Result<Applied<DriverTimer>, TimerError> {
        let mut inner = self.lock();
        let index = inner.position(id)?;

        inner.ticking.remove(id);
        let driver = inner.drivers.remove(index);
        info!("Removed driver {}", driver.id);

        let persistence = self.persist(&mut inner);
        Ok(Applied {
            value: driver,
            persistence,
        })
    }

    /// Halt every ticking process and empty the registry.
    ///
    /// Returns how many drivers were removed.
    pub fn clear_all(&self) -> Applied<usize> {
        let mut inner = self.lock();
        let removed = inner.drivers.len();

        inner.ticking.clear();
        inner.drivers.clear();
        info!("Cleared all drivers ({} removed)", removed);

        let persistence = self.persist(&mut inner);
        Applied {
            value: removed,
            persistence,
        }
    }

    pub fn get(&self, id: &str) -> Result<DriverTimer, TimerError> {
        let inner = self.lock();
        let index = inner.position(id)?;
        Ok(inner.drivers[index].clone())
    }

    /// Snapshot of every driver in creation order
    pub fn list(&self) -> Vec<DriverTimer> {
        self.lock().drivers.clone()
    }

    pub fn is_ticking(&self, id: &str) -> bool {
        self.lock().ticking.contains(id)
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.lock();
        RegistryStats {
            active_drivers: inner.drivers.len(),
            total_batteries: inner.drivers.iter().map(|d| u64::from(d.batteries)).sum(),
        }
    }

    /// Advance every ticking timer by one second.
    ///
    /// Paused timers report their unchanged value. A timer that lands on the
    /// critical threshold raises an alert; one that reaches zero halts its
    /// own ticking and reports expiry. Tick changes mark the registry dirty
    /// instead of writing through; see [`TimerRegistry::flush`].
    pub fn tick(&self) {
        let settings = self.settings.get();
        let critical_seconds = settings.critical_threshold_seconds();
        let warning = settings.warning_threshold_minutes;
        let critical = settings.critical_threshold_minutes;

        let mut inner = self.lock();
        let Inner {
            drivers,
            ticking,
            dirty,
            ..
        } = &mut *inner;

        for driver in drivers.iter_mut() {
            if !ticking.contains(&driver.id) {
                continue;
            }

            if driver.is_paused {
                self.notifier.on_tick(
                    &driver.id,
                    driver.remaining_seconds,
                    driver.tier(warning, critical),
                    true,
                );
                continue;
            }

            if driver.tick_down() {
                *dirty = true;
                self.notifier.on_tick(
                    &driver.id,
                    driver.remaining_seconds,
                    driver.tier(warning, critical),
                    false,
                );

                if driver.remaining_seconds == critical_seconds {
                    self.notifier.on_threshold_alert(&driver.id);
                }
            }

            if driver.is_expired() {
                ticking.remove(&driver.id);
                self.notifier.on_expired(&driver.id);
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Write pending tick changes. Returns whether anything was written.
    pub fn flush(&self) -> Result<bool, PersistenceFailure> {
        let mut inner = self.lock();
        if !inner.dirty {
            return Ok(false);
        }
        match self.persist(&mut inner) {
            None => Ok(true),
            Some(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::NoopNotifier,
        state::Settings,
        storage::{KeyValueStore, MemoryStore, DRIVERS_KEY, SETTINGS_KEY},
    };

    fn registry() -> (Arc<MemoryStore>, TimerRegistry) {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(PersistenceGateway::new(store.clone()));
        let settings = Arc::new(SettingsStore::new(Settings::default(), Arc::clone(&gateway)));
        (store, TimerRegistry::new(settings, gateway, Arc::new(NoopNotifier)))
    }

    #[test]
    fn create_rejects_zero_duration() {
        let (_, registry) = registry();
        let err = registry.create("Ana", 2, 0).unwrap_err();
        assert_eq!(err, TimerError::InvalidDuration);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn create_trims_name_and_floors_batteries() {
        let (_, registry) = registry();
        let driver = registry.create("  Ana  ", 0, 60).unwrap().value;
        assert_eq!(driver.name, "Ana");
        assert_eq!(driver.batteries, 1);
        assert_eq!(driver.remaining_seconds, 60);
        assert!(registry.is_ticking(&driver.id));
    }

    #[test]
    fn driver_writes_leave_settings_key_alone() {
        let (store, registry) = registry();
        let id = registry.create("Ana", 1, 60).unwrap().value.id;
        registry.tick();
        registry.flush().unwrap();
        registry.remove(&id).unwrap();

        assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
        assert_eq!(store.get(DRIVERS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn ids_are_unique_even_after_removal() {
        let (_, registry) = registry();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = registry.create("x", 1, 60).unwrap().value.id;
            registry.remove(&id).unwrap();
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let (_, registry) = registry();
        let unknown = TimerError::UnknownTimer("nope".to_string());
        assert_eq!(registry.pause("nope").unwrap_err(), unknown);
        assert_eq!(registry.resume("nope").unwrap_err(), unknown);
        assert_eq!(registry.reset("nope").unwrap_err(), unknown);
        assert_eq!(registry.extend("nope", 30).unwrap_err(), unknown);
        assert_eq!(registry.remove("nope").unwrap_err(), unknown);
        assert_eq!(registry.get("nope").unwrap_err(), unknown);
    }

    #[test]
    fn pause_is_idempotent_and_keeps_ticking() {
        let (_, registry) = registry();
        let id = registry.create("Ana", 1, 60).unwrap().value.id;

        registry.pause(&id).unwrap();
        let driver = registry.pause(&id).unwrap().value;
        assert!(driver.is_paused);
        assert!(registry.is_ticking(&id));

        assert!(!registry.toggle_pause(&id).unwrap().value.is_paused);
    }

    #[test]
    fn mutations_write_through() {
        let (store, registry) = registry();
        let id = registry.create("Ana", 1, 60).unwrap().value.id;
        let writes = store.write_count();

        registry.pause(&id).unwrap();
        assert!(store.write_count() > writes);
    }

    #[test]
    fn ticks_mark_dirty_until_flushed() {
        let (store, registry) = registry();
        registry.create("Ana", 1, 60).unwrap();
        let writes = store.write_count();

        registry.tick();
        assert!(registry.is_dirty());
        assert_eq!(store.write_count(), writes);

        assert!(registry.flush().unwrap());
        assert!(!registry.is_dirty());
        assert!(!registry.flush().unwrap());
    }

    #[test]
    fn write_failure_keeps_the_mutation() {
        let (store, registry) = registry();
        store.reject_writes(true);

        let applied = registry.create("Ana", 1, 60).unwrap();
        assert!(applied.persistence.is_some());
        assert_eq!(registry.list().len(), 1);
        assert!(registry.is_dirty());

        store.reject_writes(false);
        assert!(registry.flush().unwrap());
    }

    #[test]
    fn stats_sum_batteries() {
        let (_, registry) = registry();
        registry.create("a", 2, 60).unwrap();
        registry.create("b", 3, 60).unwrap();
        assert_eq!(
            registry.stats(),
            RegistryStats {
                active_drivers: 2,
                total_batteries: 5
            }
        );
    }

    #[test]
    fn restore_only_ticks_unexpired_and_is_idempotent() {
        let (_, registry) = registry();
        let mut expired = DriverTimer::new("e".to_string(), "E".to_string(), 1, 60);
        expired.remaining_seconds = 0;
        let live = DriverTimer::new("l".to_string(), "L".to_string(), 1, 60);
        let drivers = vec![expired, live];

        registry.restore(drivers.clone());
        registry.restore(drivers.clone());

        assert_eq!(registry.list(), drivers);
        assert!(!registry.is_ticking("e"));
        assert!(registry.is_ticking("l"));
    }

    #[test]
    fn clear_all_halts_everything() {
        let (_, registry) = registry();
        let id = registry.create("a", 1, 60).unwrap().value.id;
        registry.create("b", 1, 60).unwrap();

        assert_eq!(registry.clear_all().value, 2);
        assert!(registry.list().is_empty());
        assert!(!registry.is_ticking(&id));
        assert_eq!(registry.clear_all().value, 0);
    }
}
