//! Callback hooks and lifecycle events
//!
//! Hooks are fixed at construction time and default to no-ops. They are
//! invoked after the engine releases its internal lock, so a hook may call
//! back into lifecycle operations; the state guards absorb re-entry.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::timer::TimerState;
use super::variant::{TimerKind, VariantDetail};

/// Lifecycle events reported through hooks and the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerEvent {
    Started,
    Paused,
    Resumed,
    Reset,
    Tick,
    PhaseSwitched,
    Finished,
}

impl TimerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerEvent::Started => "started",
            TimerEvent::Paused => "paused",
            TimerEvent::Resumed => "resumed",
            TimerEvent::Reset => "reset",
            TimerEvent::Tick => "tick",
            TimerEvent::PhaseSwitched => "phase_switched",
            TimerEvent::Finished => "finished",
        }
    }
}

/// Plain-data view of a timer at one instant. This is what hooks receive
/// and what the API serializes; it holds no references back into the engine.
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub id: String,
    pub name: String,
    pub kind: TimerKind,
    pub state: TimerState,
    pub created_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// `MM:SS.CC` remaining/elapsed time, or the raw count for a counter.
    pub display: String,
    pub detail: VariantDetail,
}

type Hook = Box<dyn Fn(&TimerSnapshot) + Send + Sync>;

fn noop() -> Hook {
    Box::new(|_| {})
}

/// The construction-time-fixed set of subscribed handlers.
pub struct TimerHooks {
    on_start: Hook,
    on_pause: Hook,
    on_resume: Hook,
    on_reset: Hook,
    on_tick: Hook,
    on_phase: Hook,
    on_finish: Hook,
}

impl Default for TimerHooks {
    fn default() -> Self {
        Self {
            on_start: noop(),
            on_pause: noop(),
            on_resume: noop(),
            on_reset: noop(),
            on_tick: noop(),
            on_phase: noop(),
            on_finish: noop(),
        }
    }
}

impl TimerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_start = Box::new(hook);
        self
    }

    pub fn on_pause(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_pause = Box::new(hook);
        self
    }

    pub fn on_resume(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_resume = Box::new(hook);
        self
    }

    pub fn on_reset(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_reset = Box::new(hook);
        self
    }

    pub fn on_tick(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_tick = Box::new(hook);
        self
    }

    /// Fires on every work/rest switch of an interval timer, the discrete
    /// moment an audible cue belongs to.
    pub fn on_phase(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_phase = Box::new(hook);
        self
    }

    pub fn on_finish(mut self, hook: impl Fn(&TimerSnapshot) + Send + Sync + 'static) -> Self {
        self.on_finish = Box::new(hook);
        self
    }

    /// Route one event to its subscribed handler.
    pub(crate) fn fire(&self, event: TimerEvent, snapshot: &TimerSnapshot) {
        match event {
            TimerEvent::Started => (self.on_start)(snapshot),
            TimerEvent::Paused => (self.on_pause)(snapshot),
            TimerEvent::Resumed => (self.on_resume)(snapshot),
            TimerEvent::Reset => (self.on_reset)(snapshot),
            TimerEvent::Tick => (self.on_tick)(snapshot),
            TimerEvent::PhaseSwitched => (self.on_phase)(snapshot),
            TimerEvent::Finished => (self.on_finish)(snapshot),
        }
    }
}

impl fmt::Debug for TimerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TimerHooks")
    }
}
