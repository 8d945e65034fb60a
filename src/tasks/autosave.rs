//! Periodic persistence flush background task

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that flushes dirty settings and timer records to disk
pub async fn autosave_task(state: Arc<AppState>) {
    info!("Starting autosave task");

    let mut interval = interval(Duration::from_secs(5));

    loop {
        interval.tick().await;

        if !state.take_dirty() {
            continue;
        }
        match state.persist() {
            Ok(()) => {
                debug!("State flushed to {}", state.store_path().display());
            }
            Err(e) => {
                error!("Failed to persist state: {}", e);
                // keep the flag so the next pass retries
                state.mark_dirty();
            }
        }
    }
}
