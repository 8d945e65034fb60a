//! User settings record
//!
//! The engine never reads these; they are injected into the collaborators
//! that need them (cue dispatch, timer-creation defaults).

use serde::{Deserialize, Serialize};

/// Runtime-tunable user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether audible cues fire at all
    pub sound_enabled: bool,
    /// Cue volume, 0-100
    pub volume: u8,
    /// Default countdown target in minutes for newly created timers
    pub default_duration_min: u64,
    /// Default round-counter step for newly created timers
    pub round_step: u32,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            sound_enabled: true,
            volume: 80,
            default_duration_min: 5,
            round_step: 1,
        }
    }

    /// Apply a partial update, clamping each value to its limits.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(sound_enabled) = update.sound_enabled {
            self.sound_enabled = sound_enabled;
        }
        if let Some(volume) = update.volume {
            self.volume = volume.min(100);
        }
        if let Some(minutes) = update.default_duration_min {
            self.default_duration_min = minutes.clamp(1, 120);
        }
        if let Some(step) = update.round_step {
            self.round_step = step.clamp(1, 10);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial settings update; absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub sound_enabled: Option<bool>,
    pub volume: Option<u8>,
    pub default_duration_min: Option<u64>,
    pub round_step: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_install() {
        let settings = Settings::new();
        assert!(settings.sound_enabled);
        assert_eq!(settings.volume, 80);
        assert_eq!(settings.default_duration_min, 5);
        assert_eq!(settings.round_step, 1);
    }

    #[test]
    fn apply_clamps_out_of_range_values() {
        let mut settings = Settings::new();
        settings.apply(SettingsUpdate {
            sound_enabled: Some(false),
            volume: Some(250),
            default_duration_min: Some(0),
            round_step: Some(99),
        });
        assert!(!settings.sound_enabled);
        assert_eq!(settings.volume, 100);
        assert_eq!(settings.default_duration_min, 1);
        assert_eq!(settings.round_step, 10);
    }

    #[test]
    fn apply_leaves_absent_fields_untouched() {
        let mut settings = Settings::new();
        settings.apply(SettingsUpdate {
            volume: Some(30),
            ..Default::default()
        });
        assert_eq!(settings.volume, 30);
        assert!(settings.sound_enabled);
        assert_eq!(settings.round_step, 1);
    }
}
