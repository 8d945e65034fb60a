//! HTTP endpoint handlers
//!
//! The HTTP surface is the driver the engine was designed for: it
//! constructs variants, calls lifecycle operations, and reads snapshots.
//! Guard-failed lifecycle calls are not errors; the handler answers with
//! the unchanged snapshot, mirroring the engine's silent-no-op contract.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::engine::{Timer, TimerKind, TimerState};
use crate::state::{AppState, SettingsUpdate, TimerOptions};
use crate::utils::format::parse_time_string;

use super::responses::{
    HealthResponse, SettingsResponse, StatusResponse, TimerListResponse, TimerResponse,
};

/// Body of POST /timers
#[derive(Debug, Deserialize)]
pub struct CreateTimerRequest {
    pub kind: TimerKind,
    pub name: Option<String>,
    #[serde(flatten)]
    pub options: TimerOptions,
}

/// Body of PATCH /timers/:id. Duration may be given in milliseconds or as
/// a `MM:SS[.CC]` string; a `target` of zero clears the target.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimerRequest {
    pub name: Option<String>,
    pub duration: Option<String>,
    pub duration_ms: Option<u64>,
    pub work_ms: Option<u64>,
    pub rest_ms: Option<u64>,
    pub rounds: Option<u32>,
    pub step: Option<u32>,
    pub target: Option<u32>,
}

fn find_timer(state: &AppState, id: &str) -> Result<Timer, StatusCode> {
    match state.get_timer(id) {
        Ok(Some(timer)) => Ok(timer),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to access timer registry: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timers - Create a timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> Result<(StatusCode, Json<TimerResponse>), StatusCode> {
    match state.add_timer(request.kind, request.name, request.options) {
        Ok(snapshot) => Ok((
            StatusCode::CREATED,
            Json(TimerResponse::new("Timer created".to_string(), snapshot)),
        )),
        Err(e) => {
            error!("Failed to create timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timers - List all timers
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerListResponse>, StatusCode> {
    match state.list_timers() {
        Ok(timers) => Ok(Json(TimerListResponse {
            count: timers.len(),
            timers,
        })),
        Err(e) => {
            error!("Failed to list timers: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timers/:id - Snapshot one timer
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    Ok(Json(TimerResponse::new(
        "Timer snapshot".to_string(),
        timer.snapshot(),
    )))
}

/// Handle DELETE /timers/:id - Remove a timer
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.remove_timer(&id) {
        Ok(true) => {
            info!("Delete endpoint removed timer {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to remove timer {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PATCH /timers/:id - Rename or reconfigure a timer
///
/// Duration and interval changes follow the engine's idle-only guard;
/// requests against an active timer leave it untouched.
pub async fn update_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTimerRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;

    if let Some(name) = request.name {
        timer.set_name(name);
    }

    let duration = match (request.duration_ms, request.duration.as_deref()) {
        (Some(ms), _) => Some(Duration::from_millis(ms)),
        (None, Some(text)) => {
            let parsed = parse_time_string(text);
            if parsed.is_none() {
                warn!("Ignoring unparseable duration '{}'", text);
            }
            parsed
        }
        (None, None) => None,
    };
    if let Some(duration) = duration {
        timer.set_duration(duration);
    }

    if request.work_ms.is_some() || request.rest_ms.is_some() || request.rounds.is_some() {
        timer.set_intervals(
            request.work_ms.map(Duration::from_millis),
            request.rest_ms.map(Duration::from_millis),
            request.rounds,
        );
    }

    if let Some(step) = request.step {
        timer.set_step(step);
    }
    if let Some(target) = request.target {
        timer.set_target(if target > 0 { Some(target) } else { None });
    }

    state.note_action("update-timer");
    state.mark_dirty();
    info!("Updated timer {}", id);
    Ok(Json(TimerResponse::new(
        "Timer updated".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/start
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.start();
    state.note_action("start");
    Ok(Json(TimerResponse::new(
        "Timer started".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/pause
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.pause();
    state.note_action("pause");
    Ok(Json(TimerResponse::new(
        "Timer paused".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/resume
pub async fn resume_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.resume();
    state.note_action("resume");
    Ok(Json(TimerResponse::new(
        "Timer resumed".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/reset
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.reset();
    state.note_action("reset");
    Ok(Json(TimerResponse::new(
        "Timer reset".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/lap - Record a stopwatch lap
pub async fn lap_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.record_lap();
    state.note_action("lap");
    Ok(Json(TimerResponse::new(
        "Lap recorded".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/increment - Step a round counter up
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.increment();
    state.note_action("increment");
    Ok(Json(TimerResponse::new(
        "Counter incremented".to_string(),
        timer.snapshot(),
    )))
}

/// Handle POST /timers/:id/decrement - Step a round counter down
pub async fn decrement_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let timer = find_timer(&state, &id)?;
    timer.decrement();
    state.note_action("decrement");
    Ok(Json(TimerResponse::new(
        "Counter decremented".to_string(),
        timer.snapshot(),
    )))
}

/// Handle GET /settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, StatusCode> {
    match state.get_settings() {
        Ok(settings) => Ok(Json(SettingsResponse::ok(settings))),
        Err(e) => {
            error!("Failed to read settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /settings - Apply a partial settings update
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsResponse>, StatusCode> {
    match state.update_settings(update) {
        Ok(settings) => Ok(Json(SettingsResponse::ok(settings))),
        Err(e) => {
            error!("Failed to update settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timers = match state.list_timers() {
        Ok(timers) => timers,
        Err(e) => {
            error!("Failed to list timers: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let settings = match state.get_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to read settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let running_count = timers
        .iter()
        .filter(|t| t.state == TimerState::Running)
        .count();
    let (last_action, last_action_time) = state.last_action();

    Ok(Json(StatusResponse {
        timers_count: timers.len(),
        running_count,
        settings,
        uptime: state.uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
