//! API response structures

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::TimerSnapshot;
use crate::state::Settings;

/// Response wrapper for timer operations
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    /// Wrap a snapshot; `status` mirrors the timer's lifecycle state
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: timer.state.as_str().to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Listing of every registered timer
#[derive(Debug, Clone, Serialize)]
pub struct TimerListResponse {
    pub count: usize,
    pub timers: Vec<TimerSnapshot>,
}

/// Settings read/update response
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub settings: Settings,
}

impl SettingsResponse {
    pub fn ok(settings: Settings) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            settings,
        }
    }
}

/// Server status with registry and settings overview
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timers_count: usize,
    pub running_count: usize,
    pub settings: Settings,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
