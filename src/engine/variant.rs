//! Variant behaviors for the four timer kinds
//!
//! One concrete state machine drives every kind; the variant carries the
//! kind-specific fields and decides what a poll means (see
//! [`Timer`](super::Timer)).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::format::format_time;

/// Default target for a new countdown, 5 minutes.
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(5 * 60);
/// Default work leg of a new interval timer, 30 seconds.
pub const DEFAULT_WORK: Duration = Duration::from_secs(30);
/// Default rest leg of a new interval timer, 10 seconds.
pub const DEFAULT_REST: Duration = Duration::from_secs(10);
/// Default round count of a new interval timer.
pub const DEFAULT_ROUNDS: u32 = 8;

/// The four supported timer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Stopwatch,
    Countdown,
    Rounds,
    Interval,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Stopwatch => "stopwatch",
            TimerKind::Countdown => "countdown",
            TimerKind::Rounds => "rounds",
            TimerKind::Interval => "interval",
        }
    }

    /// Display label used when auto-naming new timers.
    pub fn label(&self) -> &'static str {
        match self {
            TimerKind::Stopwatch => "Stopwatch",
            TimerKind::Countdown => "Countdown",
            TimerKind::Rounds => "Round Counter",
            TimerKind::Interval => "Intervals",
        }
    }
}

/// Work/rest alternation phase of an interval timer.
///
/// `Idle` appears exactly when the overall state is idle; a finished
/// interval timer keeps the rest phase it expired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Work,
    Rest,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Work => "work",
            Phase::Rest => "rest",
        }
    }

    /// Human-facing phase label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Ready",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
        }
    }
}

/// A recorded stopwatch lap: split since the previous lap plus the
/// cumulative total at the moment the lap was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lap {
    pub number: u32,
    pub split_ms: u64,
    pub total_ms: u64,
}

/// Variant-specific fields of a timer.
///
/// Remaining time is always derived from the target duration and the
/// accumulated elapsed time rather than stored, so a stale poll can never
/// leave a contradictory value behind.
#[derive(Debug, Clone)]
pub enum Variant {
    Stopwatch {
        laps: Vec<Lap>,
    },
    Countdown {
        duration: Duration,
    },
    Interval {
        work: Duration,
        rest: Duration,
        total_rounds: u32,
        current_round: u32,
        phase: Phase,
    },
    Rounds {
        count: u32,
        step: u32,
        target: Option<u32>,
    },
}

impl Variant {
    pub fn stopwatch() -> Self {
        Variant::Stopwatch { laps: Vec::new() }
    }

    pub fn countdown(duration: Duration) -> Self {
        Variant::Countdown { duration }
    }

    pub fn interval(work: Duration, rest: Duration, total_rounds: u32) -> Self {
        Variant::Interval {
            work,
            rest,
            total_rounds: total_rounds.max(1),
            current_round: 0,
            phase: Phase::Idle,
        }
    }

    pub fn rounds(step: u32, target: Option<u32>) -> Self {
        Variant::Rounds {
            count: 0,
            step: step.max(1),
            target: target.filter(|t| *t > 0),
        }
    }

    pub fn kind(&self) -> TimerKind {
        match self {
            Variant::Stopwatch { .. } => TimerKind::Stopwatch,
            Variant::Countdown { .. } => TimerKind::Countdown,
            Variant::Interval { .. } => TimerKind::Interval,
            Variant::Rounds { .. } => TimerKind::Rounds,
        }
    }

    /// Whether this variant runs the anchor/poll machinery at all.
    /// Round counters share the identity contract but never tick.
    pub fn is_temporal(&self) -> bool {
        !matches!(self, Variant::Rounds { .. })
    }

    /// Prepare the first round when starting from idle.
    pub(crate) fn arm(&mut self) {
        if let Variant::Interval {
            current_round,
            phase,
            ..
        } = self
        {
            *current_round = 1;
            *phase = Phase::Work;
        }
    }

    /// Restore the construction-time baseline.
    pub(crate) fn rewind(&mut self) {
        match self {
            Variant::Stopwatch { laps } => laps.clear(),
            Variant::Countdown { .. } => {}
            Variant::Interval {
                current_round,
                phase,
                ..
            } => {
                *current_round = 0;
                *phase = Phase::Idle;
            }
            Variant::Rounds { count, .. } => *count = 0,
        }
    }

    /// Duration of the currently active interval phase. The idle phase
    /// previews the work leg, matching what a card would display.
    pub(crate) fn phase_duration(&self) -> Duration {
        match self {
            Variant::Interval { work, rest, phase, .. } => {
                if *phase == Phase::Rest {
                    *rest
                } else {
                    *work
                }
            }
            _ => Duration::ZERO,
        }
    }

    /// The string shown as the timer's main display: remaining time for
    /// deadline-driven kinds, elapsed time for the stopwatch, and the raw
    /// count for a round counter.
    pub(crate) fn display(&self, elapsed: Duration) -> String {
        match self {
            Variant::Stopwatch { .. } => format_time(elapsed),
            Variant::Countdown { duration } => format_time(duration.saturating_sub(elapsed)),
            Variant::Interval { .. } => format_time(self.phase_duration().saturating_sub(elapsed)),
            Variant::Rounds { count, .. } => count.to_string(),
        }
    }

    /// Plain-data view of the variant for snapshots and API responses.
    pub(crate) fn detail(&self, elapsed: Duration) -> VariantDetail {
        match self {
            Variant::Stopwatch { laps } => VariantDetail::Stopwatch { laps: laps.clone() },
            Variant::Countdown { duration } => VariantDetail::Countdown {
                duration_ms: duration.as_millis() as u64,
                remaining_ms: duration.saturating_sub(elapsed).as_millis() as u64,
            },
            Variant::Interval {
                work,
                rest,
                total_rounds,
                current_round,
                phase,
            } => VariantDetail::Interval {
                work_ms: work.as_millis() as u64,
                rest_ms: rest.as_millis() as u64,
                total_rounds: *total_rounds,
                current_round: *current_round,
                phase: *phase,
                phase_label: phase.label(),
                remaining_ms: self
                    .phase_duration()
                    .saturating_sub(elapsed)
                    .as_millis() as u64,
            },
            Variant::Rounds { count, step, target } => VariantDetail::Rounds {
                count: *count,
                step: *step,
                target: *target,
                target_reached: target.map_or(false, |t| *count >= t),
            },
        }
    }
}

/// Serializable variant view exposed on [`TimerSnapshot`](super::TimerSnapshot).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariantDetail {
    Stopwatch {
        laps: Vec<Lap>,
    },
    Countdown {
        duration_ms: u64,
        remaining_ms: u64,
    },
    Interval {
        work_ms: u64,
        rest_ms: u64,
        total_rounds: u32,
        current_round: u32,
        phase: Phase,
        phase_label: &'static str,
        remaining_ms: u64,
    },
    Rounds {
        count: u32,
        step: u32,
        target: Option<u32>,
        target_reached: bool,
    },
}
