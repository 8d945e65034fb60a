//! Audible-cue dispatch background task
//!
//! The engine never produces audio; it only reports events. This task is
//! the collaborator that turns those events into named cues, honoring the
//! injected sound settings. Cue emission is a structured tracing event;
//! actual beep synthesis belongs to whatever front end consumes the logs.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::engine::{TimerEvent, VariantDetail};
use crate::state::{AppState, TimerUpdate};

/// The two alert sounds of the workout UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Triple beep: a countdown or interval session completed, or a round
    /// counter met its target.
    TimerEnd,
    /// Single beep: a timer started or an interval phase switched.
    IntervalSwitch,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::TimerEnd => "timer-end",
            Cue::IntervalSwitch => "interval-switch",
        }
    }
}

/// Decide which cue, if any, an event deserves.
pub(crate) fn cue_for(update: &TimerUpdate) -> Option<Cue> {
    match update.event {
        TimerEvent::Finished => Some(Cue::TimerEnd),
        TimerEvent::Started | TimerEvent::PhaseSwitched => Some(Cue::IntervalSwitch),
        // target reached is level-triggered: every increment at or past the
        // target re-alerts
        TimerEvent::Tick => match &update.timer.detail {
            VariantDetail::Rounds {
                target_reached: true,
                ..
            } => Some(Cue::TimerEnd),
            _ => None,
        },
        _ => None,
    }
}

/// Background task that maps engine events to audible cues
pub async fn cue_dispatch_task(state: Arc<AppState>) {
    info!("Starting cue dispatch task");

    let mut events_rx = state.events_tx.subscribe();

    loop {
        match events_rx.recv().await {
            Ok(update) => {
                let Some(cue) = cue_for(&update) else {
                    continue;
                };
                match state.get_settings() {
                    Ok(settings) if settings.sound_enabled => {
                        info!(
                            cue = cue.as_str(),
                            volume = settings.volume,
                            timer = %update.timer.name,
                            event = update.event.as_str(),
                            "Playing cue"
                        );
                    }
                    Ok(_) => {
                        debug!(cue = cue.as_str(), "Sound disabled, suppressing cue");
                    }
                    Err(e) => {
                        warn!("Failed to read settings for cue: {}", e);
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Cue dispatch lagged, dropped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Timer, TimerHooks, Variant};

    fn update_for(timer: &Timer, event: TimerEvent) -> TimerUpdate {
        TimerUpdate {
            event,
            timer: timer.snapshot(),
        }
    }

    #[tokio::test]
    async fn finish_and_phase_events_map_to_cues() {
        let timer = Timer::new(
            "HIIT",
            Variant::interval(
                std::time::Duration::from_secs(30),
                std::time::Duration::from_secs(10),
                8,
            ),
            TimerHooks::new(),
        );
        assert_eq!(
            cue_for(&update_for(&timer, TimerEvent::Finished)),
            Some(Cue::TimerEnd)
        );
        assert_eq!(
            cue_for(&update_for(&timer, TimerEvent::PhaseSwitched)),
            Some(Cue::IntervalSwitch)
        );
        assert_eq!(
            cue_for(&update_for(&timer, TimerEvent::Started)),
            Some(Cue::IntervalSwitch)
        );
        assert_eq!(cue_for(&update_for(&timer, TimerEvent::Tick)), None);
        assert_eq!(cue_for(&update_for(&timer, TimerEvent::Paused)), None);
    }

    #[tokio::test]
    async fn counter_ticks_alert_only_at_target() {
        let timer = Timer::new("Rounds", Variant::rounds(2, Some(3)), TimerHooks::new());
        timer.increment();
        assert_eq!(cue_for(&update_for(&timer, TimerEvent::Tick)), None);

        timer.increment();
        assert_eq!(
            cue_for(&update_for(&timer, TimerEvent::Tick)),
            Some(Cue::TimerEnd)
        );
    }
}
