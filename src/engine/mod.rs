//! Timer execution engine
//!
//! A single polling state machine (idle → running ⇄ paused → finished)
//! shared by four variants: stopwatch, countdown, interval, round counter.
//! The engine performs no I/O; it reports through construction-time hooks
//! and exposes plain-data snapshots.

pub mod hooks;
pub mod timer;
pub mod variant;

// Re-export main types
pub use hooks::{TimerEvent, TimerHooks, TimerSnapshot};
pub use timer::{Timer, TimerState, POLL_INTERVAL};
pub use variant::{Lap, Phase, TimerKind, Variant, VariantDetail};
