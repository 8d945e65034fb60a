//! The timer state machine
//!
//! One concrete [`Timer`] type drives all four variants. Elapsed time is
//! recomputed from a fixed anchor instant on every poll instead of being
//! accumulated per tick, so poll jitter or missed polls cannot build up
//! drift; only a bounded one-period error can appear at a single instant.
//!
//! Every running timer owns exactly one spawned poll task. Pausing,
//! resetting, or destroying the timer bumps a poll epoch under the lock and
//! aborts the task, so no tick can fire after the caller has observed a
//! non-running state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use serde::{Deserialize, Serialize};

use super::hooks::{TimerEvent, TimerHooks, TimerSnapshot};
use super::variant::{Lap, Phase, TimerKind, Variant};

/// Fixed polling period. Bounds both the display resolution and the
/// worst-case latency of phase-switch and finish detection.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle states of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        }
    }
}

fn generate_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("timer-{}-{}", Utc::now().timestamp_millis(), seq)
}

struct TimerCore {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    state: TimerState,
    /// Set exactly while running: `elapsed = now - anchor`.
    anchor: Option<Instant>,
    /// Accumulated elapsed time, authoritative while not running.
    elapsed: Duration,
    /// Bumped whenever polling stops; a poll task that observes a stale
    /// epoch exits without ticking.
    epoch: u64,
    poll: Option<JoinHandle<()>>,
    destroyed: bool,
    variant: Variant,
}

impl TimerCore {
    fn live_elapsed(&self, now: Instant) -> Duration {
        match self.anchor {
            Some(anchor) => now.saturating_duration_since(anchor),
            None => self.elapsed,
        }
    }

    fn snap(&self, now: Instant) -> TimerSnapshot {
        let elapsed = self.live_elapsed(now);
        TimerSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.variant.kind(),
            state: self.state,
            created_at: self.created_at,
            elapsed_ms: elapsed.as_millis() as u64,
            display: self.variant.display(elapsed),
            detail: self.variant.detail(elapsed),
        }
    }

    fn stop_poll(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    /// One poll step. Returns true when polling should stop.
    fn tick(&mut self, now: Instant, out: &mut Vec<(TimerEvent, TimerSnapshot)>) -> bool {
        let Some(anchor) = self.anchor else {
            return true;
        };
        self.elapsed = now.saturating_duration_since(anchor);

        if let Variant::Countdown { duration } = self.variant {
            if self.elapsed >= duration {
                // clamp so remaining reads exactly zero at finish
                self.elapsed = duration;
                out.push((TimerEvent::Tick, self.snap(now)));
                self.finish(now, out);
                return true;
            }
            out.push((TimerEvent::Tick, self.snap(now)));
            return false;
        }

        if matches!(self.variant, Variant::Interval { .. }) {
            out.push((TimerEvent::Tick, self.snap(now)));
            return self.advance_interval(now, out);
        }

        // stopwatch: plain elapsed accounting
        out.push((TimerEvent::Tick, self.snap(now)));
        false
    }

    /// Work/rest alternation. Every round, the last included, runs work
    /// then rest; the timer finishes when the last rest leg expires.
    /// Returns true when the timer finished.
    fn advance_interval(&mut self, now: Instant, out: &mut Vec<(TimerEvent, TimerSnapshot)>) -> bool {
        let finished = {
            let Variant::Interval {
                work,
                rest,
                total_rounds,
                current_round,
                phase,
            } = &mut self.variant
            else {
                return false;
            };
            let phase_duration = if *phase == Phase::Rest { *rest } else { *work };
            if self.elapsed < phase_duration {
                return false;
            }
            if *phase == Phase::Work {
                *phase = Phase::Rest;
                false
            } else if *current_round >= *total_rounds {
                self.elapsed = phase_duration;
                true
            } else {
                *current_round += 1;
                *phase = Phase::Work;
                false
            }
        };

        if finished {
            self.finish(now, out);
            return true;
        }

        // re-anchor for the new phase
        self.anchor = Some(now);
        self.elapsed = Duration::ZERO;
        out.push((TimerEvent::PhaseSwitched, self.snap(now)));
        false
    }

    fn finish(&mut self, now: Instant, out: &mut Vec<(TimerEvent, TimerSnapshot)>) {
        if self.state != TimerState::Running {
            return;
        }
        self.stop_poll();
        self.anchor = None;
        self.state = TimerState::Finished;
        debug!(timer = %self.id, "finished");
        out.push((TimerEvent::Finished, self.snap(now)));
    }
}

impl Drop for TimerCore {
    fn drop(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }
}

/// Handle to one timer instance. Cheap to clone; all clones drive the same
/// underlying state machine.
#[derive(Clone)]
pub struct Timer {
    core: Arc<Mutex<TimerCore>>,
    hooks: Arc<TimerHooks>,
}

impl Timer {
    /// Create a timer with a generated id.
    pub fn new(name: impl Into<String>, variant: Variant, hooks: TimerHooks) -> Self {
        Self::restore(generate_id(), name, Utc::now(), variant, hooks)
    }

    /// Rebuild a timer from a persisted record. The timer comes back idle;
    /// live state is never persisted.
    pub fn restore(
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        variant: Variant,
        hooks: TimerHooks,
    ) -> Self {
        Self {
            core: Arc::new(Mutex::new(TimerCore {
                id: id.into(),
                name: name.into(),
                created_at,
                state: TimerState::Idle,
                anchor: None,
                elapsed: Duration::ZERO,
                epoch: 0,
                poll: None,
                destroyed: false,
                variant,
            })),
            hooks: Arc::new(hooks),
        }
    }

    // A panicking hook cannot poison the engine: hooks run outside the
    // lock, and a poisoned guard is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, TimerCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, batch: Vec<(TimerEvent, TimerSnapshot)>) {
        for (event, snapshot) in &batch {
            self.hooks.fire(*event, snapshot);
        }
    }

    /// Begin or restart accounting. No-op while already running, after
    /// destruction, and for round counters (which never tick).
    pub fn start(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            if core.destroyed || core.state == TimerState::Running || !core.variant.is_temporal()
            {
                return;
            }
            let now = Instant::now();
            if core.state == TimerState::Idle {
                core.variant.arm();
            }
            core.anchor = Some(now.checked_sub(core.elapsed).unwrap_or(now));
            core.state = TimerState::Running;
            debug!(timer = %core.id, "start");
            batch.push((TimerEvent::Started, core.snap(now)));
            let epoch = core.epoch;
            core.poll = Some(self.spawn_poll(epoch));
        }
        self.dispatch(batch);
    }

    /// Snapshot elapsed time and stop polling. No-op unless running.
    pub fn pause(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            if core.state != TimerState::Running {
                return;
            }
            let now = Instant::now();
            core.elapsed = core.live_elapsed(now);
            core.anchor = None;
            core.stop_poll();
            core.state = TimerState::Paused;
            debug!(timer = %core.id, elapsed_ms = core.elapsed.as_millis() as u64, "pause");
            batch.push((TimerEvent::Paused, core.snap(now)));
        }
        self.dispatch(batch);
    }

    /// Re-anchor from the paused elapsed time and resume polling.
    /// No-op unless paused.
    pub fn resume(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            if core.destroyed || core.state != TimerState::Paused {
                return;
            }
            let now = Instant::now();
            core.anchor = Some(now.checked_sub(core.elapsed).unwrap_or(now));
            core.state = TimerState::Running;
            debug!(timer = %core.id, "resume");
            batch.push((TimerEvent::Resumed, core.snap(now)));
            let epoch = core.epoch;
            core.poll = Some(self.spawn_poll(epoch));
        }
        self.dispatch(batch);
    }

    /// Return to the idle baseline from any state. Idempotent.
    pub fn reset(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            core.stop_poll();
            core.anchor = None;
            core.elapsed = Duration::ZERO;
            core.state = TimerState::Idle;
            core.variant.rewind();
            debug!(timer = %core.id, "reset");
            batch.push((TimerEvent::Reset, core.snap(Instant::now())));
        }
        self.dispatch(batch);
    }

    /// Tear down polling permanently. Idempotent; no callback fires after
    /// this returns.
    pub fn destroy(&self) {
        let mut core = self.lock();
        if core.destroyed {
            return;
        }
        // freeze accounting at the moment of teardown
        core.elapsed = core.live_elapsed(Instant::now());
        core.anchor = None;
        core.destroyed = true;
        core.stop_poll();
        debug!(timer = %core.id, "destroy");
    }

    fn spawn_poll(&self, epoch: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.core);
        let hooks = Arc::clone(&self.hooks);
        tokio::spawn(async move {
            poll_loop(weak, hooks, epoch).await;
        })
    }

    // --- queries -----------------------------------------------------

    pub fn id(&self) -> String {
        self.lock().id.clone()
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn kind(&self) -> TimerKind {
        self.lock().variant.kind()
    }

    pub fn state(&self) -> TimerState {
        self.lock().state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.lock().created_at
    }

    /// Elapsed time, recomputed live from the anchor while running.
    pub fn elapsed(&self) -> Duration {
        let core = self.lock();
        core.live_elapsed(Instant::now())
    }

    /// `MM:SS.CC` for temporal variants, the raw count for a counter.
    pub fn formatted_time(&self) -> String {
        let core = self.lock();
        core.variant.display(core.live_elapsed(Instant::now()))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let core = self.lock();
        core.snap(Instant::now())
    }

    // --- variant operations ------------------------------------------

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().name = name.into();
    }

    /// Change a countdown's target. Silently ignored unless the timer is
    /// idle; a running target would retroactively change remaining-time
    /// semantics.
    pub fn set_duration(&self, duration: Duration) {
        let mut core = self.lock();
        if core.state != TimerState::Idle {
            return;
        }
        if let Variant::Countdown { duration: target } = &mut core.variant {
            *target = duration;
        }
    }

    /// Change an interval timer's configuration. Idle-only, like
    /// [`set_duration`](Self::set_duration).
    pub fn set_intervals(
        &self,
        work: Option<Duration>,
        rest: Option<Duration>,
        rounds: Option<u32>,
    ) {
        let mut core = self.lock();
        if core.state != TimerState::Idle {
            return;
        }
        if let Variant::Interval {
            work: w,
            rest: r,
            total_rounds,
            ..
        } = &mut core.variant
        {
            if let Some(work) = work {
                *w = work;
            }
            if let Some(rest) = rest {
                *r = rest;
            }
            if let Some(rounds) = rounds {
                *total_rounds = rounds.max(1);
            }
        }
    }

    /// Record a stopwatch lap at the current elapsed time. No-op unless
    /// running.
    pub fn record_lap(&self) {
        let mut core = self.lock();
        if core.state != TimerState::Running {
            return;
        }
        let total = core.live_elapsed(Instant::now());
        if let Variant::Stopwatch { laps } = &mut core.variant {
            let total_ms = total.as_millis() as u64;
            let previous_ms = laps.last().map(|lap| lap.total_ms).unwrap_or(0);
            laps.push(Lap {
                number: laps.len() as u32 + 1,
                split_ms: total_ms.saturating_sub(previous_ms),
                total_ms,
            });
        }
    }

    /// Advance a round counter by its step.
    pub fn increment(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            match &mut core.variant {
                Variant::Rounds { count, step, .. } => *count = count.saturating_add(*step),
                _ => return,
            }
            batch.push((TimerEvent::Tick, core.snap(Instant::now())));
        }
        self.dispatch(batch);
    }

    /// Step a round counter back, clamping at zero.
    pub fn decrement(&self) {
        let mut batch = Vec::new();
        {
            let mut core = self.lock();
            match &mut core.variant {
                Variant::Rounds { count, step, .. } => *count = count.saturating_sub(*step),
                _ => return,
            }
            batch.push((TimerEvent::Tick, core.snap(Instant::now())));
        }
        self.dispatch(batch);
    }

    /// Change a round counter's step, clamped to at least 1.
    pub fn set_step(&self, step: u32) {
        let mut core = self.lock();
        if let Variant::Rounds { step: s, .. } = &mut core.variant {
            *s = step.max(1);
        }
    }

    /// Set or clear a round counter's target. Reaching the target is a
    /// level-triggered condition on the snapshot, not a transition.
    pub fn set_target(&self, target: Option<u32>) {
        let mut core = self.lock();
        if let Variant::Rounds { target: t, .. } = &mut core.variant {
            *t = target.filter(|n| *n > 0);
        }
    }
}

async fn poll_loop(weak: Weak<Mutex<TimerCore>>, hooks: Arc<TimerHooks>, epoch: u64) {
    let mut ticker = time::interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    // missed polls collapse into one; the absolute recompute makes up
    // the difference
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let Some(core) = weak.upgrade() else {
            break;
        };
        let mut batch = Vec::new();
        let stop = {
            let mut core = core.lock().unwrap_or_else(PoisonError::into_inner);
            if core.epoch != epoch || core.state != TimerState::Running {
                true
            } else {
                core.tick(Instant::now(), &mut batch)
            }
        };
        for (event, snapshot) in &batch {
            hooks.fire(*event, snapshot);
        }
        if stop {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::engine::variant::VariantDetail;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Let the spawned poll tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    /// Advance the paused clock in poll-period steps so every poll deadline
    /// is processed at a deterministic instant. Settling before the first
    /// step lets a freshly spawned poll task register its ticker at the
    /// current instant.
    async fn advance(total_ms: u64) {
        let mut left = total_ms;
        while left > 0 {
            settle().await;
            let step = left.min(100);
            time::advance(ms(step)).await;
            settle().await;
            left -= step;
        }
    }

    fn counter_hook(counter: &Arc<AtomicUsize>) -> impl Fn(&TimerSnapshot) + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stopwatch_accumulates_only_while_running() {
        let timer = Timer::new("Stopwatch", Variant::stopwatch(), TimerHooks::new());
        timer.start();
        advance(300).await;
        timer.pause();
        advance(500).await;
        assert_eq!(timer.elapsed(), ms(300));

        timer.resume();
        advance(200).await;
        assert_eq!(timer.elapsed(), ms(500));
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_guards_absorb_invalid_calls() {
        let timer = Timer::new("Stopwatch", Variant::stopwatch(), TimerHooks::new());
        timer.pause();
        timer.resume();
        assert_eq!(timer.state(), TimerState::Idle);

        timer.start();
        advance(100).await;
        timer.start();
        timer.resume();
        advance(100).await;
        assert_eq!(timer.elapsed(), ms(200));
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn hooks_fire_on_transitions_and_stop_with_polling() {
        let starts = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::new(AtomicUsize::new(0));
        let hooks = TimerHooks::new()
            .on_start(counter_hook(&starts))
            .on_tick(counter_hook(&ticks));
        let timer = Timer::new("Stopwatch", Variant::stopwatch(), hooks);

        timer.start();
        advance(350).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert!(ticks.load(Ordering::SeqCst) >= 3);

        timer.pause();
        let seen = ticks.load(Ordering::SeqCst);
        advance(1000).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen, "no ticks after pause");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_reaches_exactly_zero_and_finishes() {
        let finishes = Arc::new(AtomicUsize::new(0));
        let hooks = TimerHooks::new().on_finish(counter_hook(&finishes));
        let timer = Timer::new("Countdown", Variant::countdown(ms(1000)), hooks);

        timer.start();
        advance(400).await;
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        let VariantDetail::Countdown { remaining_ms, .. } = snapshot.detail else {
            panic!("expected countdown detail");
        };
        assert_eq!(remaining_ms, 600);

        advance(700).await;
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.state, TimerState::Finished);
        let VariantDetail::Countdown { remaining_ms, .. } = snapshot.detail else {
            panic!("expected countdown detail");
        };
        assert_eq!(remaining_ms, 0);
        assert_eq!(snapshot.display, "00:00.00");
        assert_eq!(finishes.load(Ordering::SeqCst), 1);

        // finished timers no longer accumulate
        advance(500).await;
        assert_eq!(timer.elapsed(), ms(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_duration_is_fixed_while_active() {
        let timer = Timer::new("Countdown", Variant::countdown(ms(2000)), TimerHooks::new());
        timer.set_duration(ms(3000));
        assert_eq!(timer.formatted_time(), "00:03.00");

        timer.start();
        timer.set_duration(ms(9000));
        timer.pause();
        timer.set_duration(ms(9000));
        let VariantDetail::Countdown { duration_ms, .. } = timer.snapshot().detail else {
            panic!("expected countdown detail");
        };
        assert_eq!(duration_ms, 3000);

        timer.reset();
        timer.set_duration(ms(1000));
        let VariantDetail::Countdown { duration_ms, .. } = timer.snapshot().detail else {
            panic!("expected countdown detail");
        };
        assert_eq!(duration_ms, 1000);
    }

    fn interval_detail(timer: &Timer) -> (Phase, u32, TimerState) {
        let snapshot = timer.snapshot();
        let VariantDetail::Interval {
            phase,
            current_round,
            ..
        } = snapshot.detail
        else {
            panic!("expected interval detail");
        };
        (phase, current_round, snapshot.state)
    }

    #[tokio::test(start_paused = true)]
    async fn interval_runs_work_then_rest_for_every_round() {
        let phases = Arc::new(AtomicUsize::new(0));
        let finishes = Arc::new(AtomicUsize::new(0));
        let hooks = TimerHooks::new()
            .on_phase(counter_hook(&phases))
            .on_finish(counter_hook(&finishes));
        let timer = Timer::new("HIIT", Variant::interval(ms(1000), ms(500), 2), hooks);

        timer.start();
        assert_eq!(interval_detail(&timer), (Phase::Work, 1, TimerState::Running));

        advance(1100).await;
        assert_eq!(interval_detail(&timer), (Phase::Rest, 1, TimerState::Running));

        advance(600).await;
        assert_eq!(interval_detail(&timer), (Phase::Work, 2, TimerState::Running));

        advance(1100).await;
        assert_eq!(interval_detail(&timer), (Phase::Rest, 2, TimerState::Running));

        advance(600).await;
        let (phase, round, state) = interval_detail(&timer);
        assert_eq!(state, TimerState::Finished);
        assert_eq!(round, 2);
        // the last rest leg ran to completion and the phase stays put
        assert_eq!(phase, Phase::Rest);
        assert_eq!(phases.load(Ordering::SeqCst), 3);
        assert_eq!(finishes.load(Ordering::SeqCst), 1);

        let VariantDetail::Interval { remaining_ms, .. } = timer.snapshot().detail else {
            panic!("expected interval detail");
        };
        assert_eq!(remaining_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_pause_preserves_the_current_phase() {
        let timer = Timer::new("HIIT", Variant::interval(ms(1000), ms(500), 2), TimerHooks::new());
        timer.start();
        advance(1100).await;
        timer.pause();
        assert_eq!(interval_detail(&timer), (Phase::Rest, 1, TimerState::Paused));

        // a long pause does not consume rest time
        advance(5000).await;
        timer.resume();
        advance(300).await;
        assert_eq!(interval_detail(&timer), (Phase::Rest, 1, TimerState::Running));
        advance(300).await;
        assert_eq!(interval_detail(&timer), (Phase::Work, 2, TimerState::Running));
    }

    #[tokio::test(start_paused = true)]
    async fn stopwatch_lap_splits_sum_to_totals() {
        let timer = Timer::new("Stopwatch", Variant::stopwatch(), TimerHooks::new());
        timer.record_lap(); // idle: ignored

        timer.start();
        advance(250).await;
        timer.record_lap();
        advance(130).await;
        timer.record_lap();
        advance(400).await;
        timer.record_lap();

        timer.pause();
        timer.record_lap(); // paused: ignored

        let VariantDetail::Stopwatch { laps } = timer.snapshot().detail else {
            panic!("expected stopwatch detail");
        };
        assert_eq!(laps.len(), 3);
        assert_eq!(
            laps.iter().map(|lap| lap.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            laps.iter().map(|lap| lap.total_ms).collect::<Vec<_>>(),
            vec![250, 380, 780]
        );
        for k in 0..laps.len() {
            let split_sum: u64 = laps[..=k].iter().map(|lap| lap.split_ms).sum();
            assert_eq!(split_sum, laps[k].total_ms);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn round_counter_steps_and_clamps() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let hooks = TimerHooks::new().on_tick(counter_hook(&ticks));
        let timer = Timer::new("Rounds", Variant::rounds(3, None), hooks);

        // counters have no temporal lifecycle
        timer.start();
        assert_eq!(timer.state(), TimerState::Idle);

        for _ in 0..4 {
            timer.increment();
        }
        assert_eq!(timer.formatted_time(), "12");
        assert_eq!(ticks.load(Ordering::SeqCst), 4);

        timer.reset();
        timer.set_step(1);
        timer.increment();
        timer.increment();
        timer.set_step(3);
        timer.decrement();
        let VariantDetail::Rounds { count, .. } = timer.snapshot().detail else {
            panic!("expected rounds detail");
        };
        assert_eq!(count, 0, "decrement clamps at zero");
    }

    #[tokio::test(start_paused = true)]
    async fn round_counter_target_is_level_triggered() {
        let timer = Timer::new("Rounds", Variant::rounds(2, Some(5)), TimerHooks::new());
        timer.increment();
        timer.increment();
        let VariantDetail::Rounds { target_reached, .. } = timer.snapshot().detail else {
            panic!("expected rounds detail");
        };
        assert!(!target_reached);

        timer.increment();
        let VariantDetail::Rounds { count, target_reached, .. } = timer.snapshot().detail else {
            panic!("expected rounds detail");
        };
        assert_eq!(count, 6);
        assert!(target_reached);

        timer.set_target(None);
        let VariantDetail::Rounds { target, target_reached, .. } = timer.snapshot().detail else {
            panic!("expected rounds detail");
        };
        assert_eq!(target, None);
        assert!(!target_reached);

        // step 0 clamps to 1
        timer.set_step(0);
        timer.increment();
        let VariantDetail::Rounds { count, .. } = timer.snapshot().detail else {
            panic!("expected rounds detail");
        };
        assert_eq!(count, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_idempotent_from_any_state() {
        let timer = Timer::new("HIIT", Variant::interval(ms(300), ms(200), 3), TimerHooks::new());
        timer.start();
        advance(400).await; // into round 1 rest

        timer.reset();
        let first = timer.snapshot();
        timer.reset();
        let second = timer.snapshot();

        for snapshot in [&first, &second] {
            assert_eq!(snapshot.state, TimerState::Idle);
            assert_eq!(snapshot.elapsed_ms, 0);
            let VariantDetail::Interval {
                phase,
                current_round,
                remaining_ms,
                ..
            } = &snapshot.detail
            else {
                panic!("expected interval detail");
            };
            assert_eq!(*phase, Phase::Idle);
            assert_eq!(*current_round, 0);
            assert_eq!(*remaining_ms, 300, "idle previews the work leg");
        }

        // polling is gone
        advance(400).await;
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_stops_polling_and_is_idempotent() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let hooks = TimerHooks::new().on_tick(counter_hook(&ticks));
        let timer = Timer::new("Stopwatch", Variant::stopwatch(), hooks);

        timer.start();
        advance(200).await;
        timer.destroy();
        timer.destroy();

        let seen = ticks.load(Ordering::SeqCst);
        advance(500).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);

        // a destroyed timer refuses to re-arm
        timer.start();
        advance(200).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }
}
