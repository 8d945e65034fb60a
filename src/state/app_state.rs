//! Main application state management
//!
//! Owns the timer registry, the user settings, and the event bus that ties
//! engine hooks to their subscribers. There is no global state anywhere;
//! whoever drives the timers holds an `Arc<AppState>` passed by reference.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::info;

use crate::engine::{
    variant::{DEFAULT_COUNTDOWN, DEFAULT_REST, DEFAULT_ROUNDS, DEFAULT_WORK},
    Timer, TimerEvent, TimerHooks, TimerKind, TimerSnapshot, Variant, VariantDetail,
};

use super::{PersistedState, Settings, SettingsUpdate, Store, TimerRecord};

/// One event-bus message: which engine event fired and the snapshot taken
/// at that instant.
#[derive(Debug, Clone)]
pub struct TimerUpdate {
    pub event: TimerEvent,
    pub timer: TimerSnapshot,
}

/// Optional per-kind configuration supplied when creating a timer. Absent
/// fields fall back to the user settings or the engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimerOptions {
    pub duration_ms: Option<u64>,
    pub work_ms: Option<u64>,
    pub rest_ms: Option<u64>,
    pub rounds: Option<u32>,
    pub step: Option<u32>,
    pub target: Option<u32>,
}

/// Main application state shared across handlers and background tasks.
pub struct AppState {
    /// Live engine instances, in creation order
    timers: Mutex<Vec<Timer>>,
    /// User settings
    settings: Mutex<Settings>,
    /// File-backed persistence
    store: Store,
    /// Set whenever settings or the timer list change; drained by autosave
    dirty: AtomicBool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Event bus fed by every timer's construction-time hooks
    pub events_tx: broadcast::Sender<TimerUpdate>,
}

impl AppState {
    /// Create the application state, restoring any persisted timers as
    /// fresh idle instances.
    pub fn new(port: u16, host: String, store: Store) -> Self {
        let persisted = store.load();
        let (events_tx, _) = broadcast::channel(256);

        let timers: Vec<Timer> = persisted
            .timers
            .iter()
            .map(|record| timer_from_record(record, &events_tx))
            .collect();
        if !timers.is_empty() {
            info!(
                "Restored {} timers from {}",
                timers.len(),
                store.path().display()
            );
        }

        Self {
            timers: Mutex::new(timers),
            settings: Mutex::new(persisted.settings),
            store,
            dirty: AtomicBool::new(false),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            events_tx,
        }
    }

    /// Create a timer of the given kind, wire its hooks to the event bus
    /// and register it. Auto-names by per-kind count when no name is given.
    pub fn add_timer(
        &self,
        kind: TimerKind,
        name: Option<String>,
        options: TimerOptions,
    ) -> Result<TimerSnapshot, String> {
        let settings = self.get_settings()?;
        let variant = match kind {
            TimerKind::Stopwatch => Variant::stopwatch(),
            TimerKind::Countdown => Variant::countdown(
                options
                    .duration_ms
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| Duration::from_secs(settings.default_duration_min * 60)),
            ),
            TimerKind::Rounds => {
                Variant::rounds(options.step.unwrap_or(settings.round_step), options.target)
            }
            TimerKind::Interval => Variant::interval(
                options.work_ms.map(Duration::from_millis).unwrap_or(DEFAULT_WORK),
                options.rest_ms.map(Duration::from_millis).unwrap_or(DEFAULT_REST),
                options.rounds.unwrap_or(DEFAULT_ROUNDS),
            ),
        };

        let mut timers = self
            .timers
            .lock()
            .map_err(|e| format!("Failed to lock timer registry: {}", e))?;
        let kind_count = timers.iter().filter(|t| t.kind() == kind).count();
        let name = name.unwrap_or_else(|| format!("{} {}", kind.label(), kind_count + 1));
        let timer = Timer::new(name, variant, event_hooks(self.events_tx.clone()));
        let snapshot = timer.snapshot();
        timers.push(timer);
        drop(timers);

        self.note_action(&format!("add-{}", kind.as_str()));
        self.mark_dirty();
        info!(
            "Created {} timer '{}' ({})",
            kind.as_str(),
            snapshot.name,
            snapshot.id
        );
        Ok(snapshot)
    }

    /// Destroy and unregister a timer. Returns false when the id is
    /// unknown; removing twice is safe.
    pub fn remove_timer(&self, id: &str) -> Result<bool, String> {
        let mut timers = self
            .timers
            .lock()
            .map_err(|e| format!("Failed to lock timer registry: {}", e))?;
        let Some(index) = timers.iter().position(|t| t.id() == id) else {
            return Ok(false);
        };
        let timer = timers.remove(index);
        drop(timers);

        timer.destroy();
        self.note_action("remove-timer");
        self.mark_dirty();
        info!("Removed timer {}", id);
        Ok(true)
    }

    /// Look up a live timer handle by id.
    pub fn get_timer(&self, id: &str) -> Result<Option<Timer>, String> {
        let timers = self
            .timers
            .lock()
            .map_err(|e| format!("Failed to lock timer registry: {}", e))?;
        Ok(timers.iter().find(|t| t.id() == id).cloned())
    }

    /// Snapshot every registered timer, in creation order.
    pub fn list_timers(&self) -> Result<Vec<TimerSnapshot>, String> {
        let timers = self
            .timers
            .lock()
            .map_err(|e| format!("Failed to lock timer registry: {}", e))?;
        Ok(timers.iter().map(|t| t.snapshot()).collect())
    }

    /// Get a copy of the current settings
    pub fn get_settings(&self) -> Result<Settings, String> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|e| format!("Failed to lock settings: {}", e))
    }

    /// Apply a partial settings update and return the result
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, String> {
        let mut settings = self
            .settings
            .lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))?;
        settings.apply(update);
        let updated = settings.clone();
        drop(settings);

        self.note_action("update-settings");
        self.mark_dirty();
        info!(
            "Settings updated: sound={}, volume={}",
            updated.sound_enabled, updated.volume
        );
        Ok(updated)
    }

    /// Write settings and timer records to the store.
    pub fn persist(&self) -> anyhow::Result<()> {
        let settings = self.get_settings().map_err(anyhow::Error::msg)?;
        let records: Vec<TimerRecord> = {
            let timers = self
                .timers
                .lock()
                .map_err(|e| anyhow::anyhow!("Failed to lock timer registry: {}", e))?;
            timers.iter().map(record_of).collect()
        };
        self.store.save(&PersistedState {
            settings,
            timers: records,
        })
    }

    pub fn store_path(&self) -> &std::path::Path {
        self.store.path()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Clear and return the dirty flag; the caller owns the flush.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::Relaxed)
    }

    /// Record the most recent driver action for the status endpoint
    pub fn note_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

/// Hooks that forward every engine event onto the broadcast bus. An absent
/// or lagging subscriber is not an error.
fn event_hooks(tx: broadcast::Sender<TimerUpdate>) -> TimerHooks {
    let forward = |event: TimerEvent| {
        let tx = tx.clone();
        move |snapshot: &TimerSnapshot| {
            let _ = tx.send(TimerUpdate {
                event,
                timer: snapshot.clone(),
            });
        }
    };
    TimerHooks::new()
        .on_start(forward(TimerEvent::Started))
        .on_pause(forward(TimerEvent::Paused))
        .on_resume(forward(TimerEvent::Resumed))
        .on_reset(forward(TimerEvent::Reset))
        .on_tick(forward(TimerEvent::Tick))
        .on_phase(forward(TimerEvent::PhaseSwitched))
        .on_finish(forward(TimerEvent::Finished))
}

fn timer_from_record(record: &TimerRecord, tx: &broadcast::Sender<TimerUpdate>) -> Timer {
    let variant = match record.kind {
        TimerKind::Stopwatch => Variant::stopwatch(),
        TimerKind::Countdown => Variant::countdown(
            record
                .duration_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_COUNTDOWN),
        ),
        TimerKind::Rounds => Variant::rounds(record.step.unwrap_or(1), record.target),
        TimerKind::Interval => Variant::interval(
            record.work_ms.map(Duration::from_millis).unwrap_or(DEFAULT_WORK),
            record.rest_ms.map(Duration::from_millis).unwrap_or(DEFAULT_REST),
            record.rounds.unwrap_or(DEFAULT_ROUNDS),
        ),
    };
    Timer::restore(
        record.id.clone(),
        record.name.clone(),
        record.created_at,
        variant,
        event_hooks(tx.clone()),
    )
}

fn record_of(timer: &Timer) -> TimerRecord {
    let snapshot = timer.snapshot();
    let mut record = TimerRecord {
        id: snapshot.id,
        name: snapshot.name,
        kind: snapshot.kind,
        created_at: snapshot.created_at,
        duration_ms: None,
        work_ms: None,
        rest_ms: None,
        rounds: None,
        step: None,
        target: None,
    };
    match snapshot.detail {
        VariantDetail::Countdown { duration_ms, .. } => record.duration_ms = Some(duration_ms),
        VariantDetail::Interval {
            work_ms,
            rest_ms,
            total_rounds,
            ..
        } => {
            record.work_ms = Some(work_ms);
            record.rest_ms = Some(rest_ms);
            record.rounds = Some(total_rounds);
        }
        VariantDetail::Rounds { step, target, .. } => {
            record.step = Some(step);
            record.target = target;
        }
        VariantDetail::Stopwatch { .. } => {}
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_state(tag: &str) -> AppState {
        let path = std::env::temp_dir().join(format!(
            "gym-bell-app-test-{}-{}.json",
            std::process::id(),
            tag
        ));
        let _ = std::fs::remove_file(&path);
        AppState::new(0, "127.0.0.1".to_string(), Store::new(path))
    }

    #[tokio::test]
    async fn add_timer_auto_names_by_kind_count() {
        let state = scratch_state("naming");
        let first = state
            .add_timer(TimerKind::Stopwatch, None, TimerOptions::default())
            .unwrap();
        let second = state
            .add_timer(TimerKind::Stopwatch, None, TimerOptions::default())
            .unwrap();
        let rounds = state
            .add_timer(TimerKind::Rounds, None, TimerOptions::default())
            .unwrap();

        assert_eq!(first.name, "Stopwatch 1");
        assert_eq!(second.name, "Stopwatch 2");
        assert_eq!(rounds.name, "Round Counter 1");
        assert_eq!(state.list_timers().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn countdown_defaults_come_from_settings() {
        let state = scratch_state("defaults");
        state
            .update_settings(SettingsUpdate {
                default_duration_min: Some(2),
                ..Default::default()
            })
            .unwrap();
        let snapshot = state
            .add_timer(TimerKind::Countdown, None, TimerOptions::default())
            .unwrap();
        let VariantDetail::Countdown { duration_ms, .. } = snapshot.detail else {
            panic!("expected countdown detail");
        };
        assert_eq!(duration_ms, 120_000);
    }

    #[tokio::test]
    async fn remove_timer_is_idempotent() {
        let state = scratch_state("remove");
        let snapshot = state
            .add_timer(TimerKind::Countdown, None, TimerOptions::default())
            .unwrap();
        assert!(state.remove_timer(&snapshot.id).unwrap());
        assert!(!state.remove_timer(&snapshot.id).unwrap());
        assert!(state.get_timer(&snapshot.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn persist_round_trips_through_a_new_state() {
        let state = scratch_state("persist");
        state
            .add_timer(
                TimerKind::Interval,
                Some("Evening HIIT".to_string()),
                TimerOptions {
                    work_ms: Some(20_000),
                    rest_ms: Some(5_000),
                    rounds: Some(4),
                    ..Default::default()
                },
            )
            .unwrap();
        state.persist().unwrap();

        let reloaded = AppState::new(
            0,
            "127.0.0.1".to_string(),
            Store::new(state.store_path().to_path_buf()),
        );
        let timers = reloaded.list_timers().unwrap();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].name, "Evening HIIT");
        let VariantDetail::Interval {
            work_ms,
            rest_ms,
            total_rounds,
            ..
        } = &timers[0].detail
        else {
            panic!("expected interval detail");
        };
        assert_eq!((*work_ms, *rest_ms, *total_rounds), (20_000, 5_000, 4));
        let _ = std::fs::remove_file(state.store_path());
    }

    #[tokio::test]
    async fn events_from_hooks_reach_the_bus() {
        let state = scratch_state("events");
        let mut rx = state.events_tx.subscribe();
        let snapshot = state
            .add_timer(TimerKind::Rounds, None, TimerOptions::default())
            .unwrap();
        let timer = state.get_timer(&snapshot.id).unwrap().unwrap();

        timer.increment();
        let update = rx.try_recv().unwrap();
        assert_eq!(update.event, TimerEvent::Tick);
        assert_eq!(update.timer.id, snapshot.id);
    }
}
