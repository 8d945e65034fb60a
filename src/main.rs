//! Gym Bell - A state-managed HTTP server for workout timer orchestration
//!
//! This is the main entry point for the gym-bell application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use gym_bell::{
    api::create_router,
    config::Config,
    state::{AppState, Store},
    tasks::{autosave_task, cue_dispatch_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("gym_bell={},tower_http=info", config.log_level()))
        .init();

    info!("Starting gym-bell server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, state_file={}",
        config.host,
        config.port,
        config.state_file.display()
    );

    // Create application state, restoring persisted timers and settings
    let store = Store::new(config.state_file.clone());
    let state = Arc::new(AppState::new(config.port, config.host.clone(), store));

    // Start the background collaborators: audible cues and persistence
    tokio::spawn(cue_dispatch_task(Arc::clone(&state)));
    tokio::spawn(autosave_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers               - Create a timer");
    info!("  GET    /timers               - List timers");
    info!("  GET    /timers/:id           - Timer snapshot");
    info!("  PATCH  /timers/:id           - Rename or reconfigure");
    info!("  DELETE /timers/:id           - Remove a timer");
    info!("  POST   /timers/:id/start     - Start / restart");
    info!("  POST   /timers/:id/pause     - Pause");
    info!("  POST   /timers/:id/resume    - Resume");
    info!("  POST   /timers/:id/reset     - Reset to idle");
    info!("  POST   /timers/:id/lap       - Record a stopwatch lap");
    info!("  POST   /timers/:id/increment - Step a round counter up");
    info!("  POST   /timers/:id/decrement - Step a round counter down");
    info!("  GET    /settings             - Read settings");
    info!("  PUT    /settings             - Update settings");
    info!("  GET    /status               - Server status");
    info!("  GET    /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Flush any state the autosave task has not written yet
    if let Err(e) = state.persist() {
        tracing::error!("Final state flush failed: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
