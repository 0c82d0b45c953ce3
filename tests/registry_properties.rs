use std::sync::{Arc, Mutex};

use charge_countdown::{
    notify::{NotificationPort, TimerEvent},
    state::{Settings, SettingsStore, Tier, TimerRegistry},
    storage::{MemoryStore, PersistenceGateway},
    TimerError,
};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<TimerEvent>>,
}

impl Recorder {
    fn take(&self) -> Vec<TimerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    fn push(&self, event: TimerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl NotificationPort for Recorder {
    fn on_tick(&self, id: &str, remaining_seconds: u64, tier: Tier, is_paused: bool) {
        self.push(TimerEvent::Tick {
            id: id.to_string(),
            remaining_seconds,
            display: charge_countdown::utils::format_hms(remaining_seconds),
            tier,
            is_paused,
        });
    }

    fn on_threshold_alert(&self, id: &str) {
        self.push(TimerEvent::ThresholdAlert { id: id.to_string() });
    }

    fn on_expired(&self, id: &str) {
        self.push(TimerEvent::Expired { id: id.to_string() });
    }
}

struct Harness {
    gateway: Arc<PersistenceGateway>,
    recorder: Arc<Recorder>,
    registry: TimerRegistry,
}

fn harness() -> Harness {
    let gateway = Arc::new(PersistenceGateway::new(Arc::new(MemoryStore::new())));
    let settings = Arc::new(SettingsStore::new(Settings::default(), Arc::clone(&gateway)));
    let recorder = Arc::new(Recorder::default());
    let registry = TimerRegistry::new(settings, Arc::clone(&gateway), recorder.clone());
    Harness {
        gateway,
        recorder,
        registry,
    }
}

fn count<F: Fn(&TimerEvent) -> bool>(events: &[TimerEvent], pred: F) -> usize {
    events.iter().filter(|event| pred(event)).count()
}

#[test]
fn create_with_zero_duration_fails() {
    let h = harness();
    assert_eq!(
        h.registry.create("Ana", 2, 0).unwrap_err(),
        TimerError::InvalidDuration
    );
}

#[test]
fn ticking_1800_times_decrements_exactly() {
    let h = harness();
    let id = h.registry.create("Ana", 2, 3600).unwrap().value.id;

    for _ in 0..1800 {
        h.registry.tick();
    }

    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 1800);
    let events = h.recorder.take();
    assert_eq!(count(&events, |e| matches!(e, TimerEvent::Expired { .. })), 0);
    assert_eq!(count(&events, |e| matches!(e, TimerEvent::Tick { .. })), 1800);
}

#[test]
fn critical_alert_fires_once_on_exact_crossing() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 1803).unwrap().value.id;

    for _ in 0..10 {
        h.registry.tick();
    }

    let events = h.recorder.take();
    let alerts: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, TimerEvent::ThresholdAlert { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(alerts.len(), 1);

    // the alert follows the tick that landed on 1800
    match &events[alerts[0] - 1] {
        TimerEvent::Tick {
            id: tick_id,
            remaining_seconds,
            tier,
            ..
        } => {
            assert_eq!(tick_id, &id);
            assert_eq!(*remaining_seconds, 1800);
            assert_eq!(*tier, Tier::Critical);
        }
        other => panic!("expected tick before alert, got {:?}", other),
    }
}

#[test]
fn expiry_halts_ticking_and_fires_once() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 3).unwrap().value.id;

    for _ in 0..10 {
        h.registry.tick();
    }

    let events = h.recorder.take();
    assert_eq!(count(&events, |e| matches!(e, TimerEvent::Tick { .. })), 3);
    assert_eq!(events.last(), Some(&TimerEvent::Expired { id: id.clone() }));
    assert_eq!(count(&events, |e| matches!(e, TimerEvent::Expired { .. })), 1);
    assert!(!h.registry.is_ticking(&id));
    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 0);
}

#[test]
fn removed_timer_never_ticks_again() {
    let h = harness();
    let gone = h.registry.create("Gone", 1, 600).unwrap().value.id;
    let kept = h.registry.create("Kept", 1, 600).unwrap().value.id;

    h.registry.tick();
    h.registry.remove(&gone).unwrap();
    h.recorder.take();

    for _ in 0..5 {
        h.registry.tick();
    }

    let events = h.recorder.take();
    assert!(events.iter().all(|e| e.id() != gone));
    assert_eq!(events.iter().filter(|e| e.id() == kept).count(), 5);
}

#[test]
fn extend_revives_expired_timer() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 1).unwrap().value.id;
    h.registry.tick();
    assert!(!h.registry.is_ticking(&id));
    h.recorder.take();

    let driver = h.registry.extend(&id, 30).unwrap().value;
    assert_eq!(driver.remaining_seconds, 1800);
    assert_eq!(driver.total_seconds, 1801);

    h.registry.tick();
    let events = h.recorder.take();
    assert!(matches!(
        events.first(),
        Some(TimerEvent::Tick { remaining_seconds: 1799, .. })
    ));
}

#[test]
fn pause_freezes_and_resume_continues() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 100).unwrap().value.id;
    h.registry.tick();

    h.registry.pause(&id).unwrap();
    for _ in 0..20 {
        h.registry.tick();
    }
    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 99);

    let paused_ticks = h.recorder.take();
    assert!(paused_ticks.iter().skip(1).all(|e| matches!(
        e,
        TimerEvent::Tick {
            remaining_seconds: 99,
            is_paused: true,
            ..
        }
    )));

    h.registry.resume(&id).unwrap();
    h.registry.tick();
    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 98);
}

#[test]
fn paused_timer_at_threshold_raises_no_alert() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 1801).unwrap().value.id;
    h.registry.pause(&id).unwrap();

    for _ in 0..3 {
        h.registry.tick();
    }
    let events = h.recorder.take();
    assert_eq!(count(&events, |e| matches!(e, TimerEvent::ThresholdAlert { .. })), 0);
}

#[test]
fn reset_restarts_an_expired_timer() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 2).unwrap().value.id;
    h.registry.tick();
    h.registry.tick();
    assert!(!h.registry.is_ticking(&id));

    let driver = h.registry.reset(&id).unwrap().value;
    assert_eq!(driver.remaining_seconds, 2);
    assert!(h.registry.is_ticking(&id));

    h.registry.tick();
    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 1);
}

#[test]
fn reset_twice_keeps_a_single_ticking_process() {
    let h = harness();
    let id = h.registry.create("Ana", 1, 60).unwrap().value.id;
    h.registry.reset(&id).unwrap();
    h.registry.reset(&id).unwrap();
    h.recorder.take();

    h.registry.tick();
    assert_eq!(h.registry.get(&id).unwrap().remaining_seconds, 59);
    assert_eq!(h.recorder.take().len(), 1);
}

#[test]
fn save_load_round_trip_reconstructs_registry() {
    let h = harness();
    let a = h.registry.create("Ana", 2, 600).unwrap().value.id;
    let b = h.registry.create("Luis", 4, 90).unwrap().value.id;
    h.registry.tick();
    h.registry.pause(&a).unwrap();
    h.registry.extend(&b, 5).unwrap();

    let before = h.registry.list();
    let restored = h.gateway.load();

    let other = harness();
    other.registry.restore(restored.drivers);
    assert_eq!(other.registry.list(), before);
    assert!(other.registry.is_ticking(&a));
    assert!(other.registry.is_ticking(&b));
}

#[test]
fn ids_do_not_collide_with_restored_ones() {
    let h = harness();
    let first = h.registry.create("Ana", 1, 60).unwrap().value;

    let other = harness();
    other.registry.restore(vec![first.clone()]);
    for _ in 0..20 {
        let id = other.registry.create("x", 1, 60).unwrap().value.id;
        assert_ne!(id, first.id);
    }
    assert_eq!(other.registry.list().len(), 21);
}
