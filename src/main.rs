//! SendShield - Local settings service for delay-send email protection
//! 
//! This is the main entry point for the send-shield application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use send_shield::{
    config::Config,
    state::{AppState, Outbox},
    store::{JsonFileBackend, SettingsStore},
    api::create_router,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("send_shield={},tower_http=info", config.log_level()))
        .init();

    info!("Starting send-shield server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, store={}",
          config.host, config.port, config.store.display());

    // Load persisted settings, every missing or broken field falls back to its default
    let backend = JsonFileBackend::open(&config.store)?;
    let store = SettingsStore::init(Box::new(backend))?;

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        store,
        Outbox::with_demo_emails(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /settings               - Persisted settings and delay presets");
    info!("  PUT  /settings/delay         - Set the delay (clamped to 5s..5m)");
    info!("  PUT  /settings/delay/preset  - Select a preset delay");
    info!("  PUT  /settings/delay/enabled - Toggle delay protection");
    info!("  PUT  /settings/theme         - Switch theme");
    info!("  PUT  /settings/tab           - Remember the active tab");
    info!("  POST /account/sign-in        - Mark the account signed in");
    info!("  POST /account/sign-out       - Mark the account signed out");
    info!("  GET  /preview                - Countdown preview state");
    info!("  POST /preview/start          - Start the countdown preview");
    info!("  POST /preview/reset          - Reset the countdown preview");
    info!("  GET  /outbox                 - Held emails");
    info!("  POST /outbox/:id/edit        - Reopen a held email");
    info!("  POST /outbox/:id/cancel      - Cancel a held email");
    info!("  POST /outbox/:id/send-now    - Skip the remaining delay");
    info!("  GET  /status                 - Settings, countdown and uptime");
    info!("  GET  /health                 - Health check");

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

    // cancels a running preview ticker
    if let Err(e) = state.reset_countdown() {
        tracing::warn!("Failed to stop countdown preview: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
