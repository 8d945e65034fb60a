//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod autosave;
pub mod cues;

// Re-export main functions
pub use autosave::autosave_task;
pub use cues::cue_dispatch_task;
