//! Gym Bell - A state-managed HTTP server for workout timer orchestration
//!
//! This library provides a shared timer execution engine with four variants
//! (stopwatch, countdown, interval, round counter) plus the registry,
//! settings, persistence, and background tasks that drive it.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Timer, TimerHooks, TimerKind, TimerState};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
