//! Charge Countdown - A state-managed HTTP server for battery-swap timers
//!
//! This is the main entry point for the charge-countdown application.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use charge_countdown::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::{FileStore, KeyValueStore, MemoryStore},
    tasks::{autosave_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("charge_countdown={},tower_http=info", config.log_level()))
        .init();

    info!("Starting charge-countdown server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_dir={}, save_interval={}s, ephemeral={}",
        config.host,
        config.port,
        config.data_dir.display(),
        config.save_interval,
        config.ephemeral
    );

    let store: Arc<dyn KeyValueStore> = if config.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::open(&config.data_dir).with_context(|| {
            format!("Failed to open data directory {}", config.data_dir.display())
        })?;
        Arc::new(store)
    };

    // Create application state, restoring any saved timers
    let state = Arc::new(AppState::open(store, config.port, config.host.clone()));

    // Start the countdown scheduler and the autosave loop
    tokio::spawn(ticker_task(Arc::clone(&state.registry)));
    tokio::spawn(autosave_task(Arc::clone(&state.registry), config.save_period()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /drivers                  - List drivers");
    info!("  POST   /drivers                  - Add a driver");
    info!("  DELETE /drivers                  - Remove every driver");
    info!("  GET    /drivers/:id              - Show one driver");
    info!("  DELETE /drivers/:id              - Remove a driver");
    info!("  POST   /drivers/:id/pause        - Pause a timer");
    info!("  POST   /drivers/:id/resume       - Resume a timer");
    info!("  POST   /drivers/:id/toggle-pause - Toggle pause");
    info!("  POST   /drivers/:id/reset        - Reset a timer");
    info!("  POST   /drivers/:id/extend       - Add minutes");
    info!("  GET    /settings | PUT /settings - Timer settings");
    info!("  GET    /status                   - Counters and uptime");
    info!("  GET    /events                   - Server-sent timer events");
    info!("  GET    /health                   - Health check");

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

    state.flush();
    info!("Server shutdown complete");
    Ok(())
}
