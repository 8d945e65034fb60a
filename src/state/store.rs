//! JSON-file persistence of settings and the timer list
//!
//! The engine itself never touches the disk. What gets written are plain
//! key-value records: timer configuration, never live timing state. Reads
//! degrade to defaults so a missing or corrupt file can never keep the
//! server from starting.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::engine::TimerKind;

use super::Settings;

/// Plain persisted record of one timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: String,
    pub name: String,
    pub kind: TimerKind,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub work_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rest_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<u32>,
}

/// Everything the server persists between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub settings: Settings,
    pub timers: Vec<TimerRecord>,
}

/// File-backed store for [`PersistedState`].
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(&self) -> PersistedState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return PersistedState::default();
            }
            Err(e) => {
                error!("Failed to read state file {}: {}", self.path.display(), e);
                return PersistedState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                error!("Failed to parse state file {}: {}", self.path.display(), e);
                PersistedState::default()
            }
        }
    }

    /// Write the persisted state. Errors surface to the caller for logging
    /// and a later retry.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        let raw = serde_json::to_string_pretty(state).context("serialize persisted state")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create state directory {}", parent.display()))?;
            }
        }
        fs::write(&self.path, raw)
            .with_context(|| format!("write state file {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(tag: &str) -> Store {
        let path = std::env::temp_dir().join(format!(
            "gym-bell-test-{}-{}.json",
            std::process::id(),
            tag
        ));
        let _ = fs::remove_file(&path);
        Store::new(path)
    }

    #[test]
    fn missing_file_loads_as_defaults() {
        let store = scratch_store("missing");
        let state = store.load();
        assert!(state.timers.is_empty());
        assert_eq!(state.settings.volume, Settings::new().volume);
    }

    #[test]
    fn corrupt_file_loads_as_defaults() {
        let store = scratch_store("corrupt");
        fs::write(store.path(), "{not json").unwrap();
        let state = store.load();
        assert!(state.timers.is_empty());
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn saved_records_come_back() {
        let store = scratch_store("roundtrip");
        let mut state = PersistedState::default();
        state.settings.volume = 40;
        state.timers.push(TimerRecord {
            id: "timer-1".to_string(),
            name: "Morning HIIT".to_string(),
            kind: TimerKind::Interval,
            created_at: Utc::now(),
            duration_ms: None,
            work_ms: Some(30_000),
            rest_ms: Some(10_000),
            rounds: Some(8),
            step: None,
            target: None,
        });
        store.save(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.settings.volume, 40);
        assert_eq!(loaded.timers.len(), 1);
        assert_eq!(loaded.timers[0].name, "Morning HIIT");
        assert_eq!(loaded.timers[0].work_ms, Some(30_000));
        let _ = fs::remove_file(store.path());
    }
}
