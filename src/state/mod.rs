//! State management module
//!
//! This module contains the timer registry, user settings, and the
//! file-backed store that persists both.

pub mod app_state;
pub mod settings;
pub mod store;

// Re-export main types
pub use app_state::{AppState, TimerOptions, TimerUpdate};
pub use settings::{Settings, SettingsUpdate};
pub use store::{PersistedState, Store, TimerRecord};
