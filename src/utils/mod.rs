//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_time, format_time_short, parse_time_string};
pub use signals::shutdown_signal;
