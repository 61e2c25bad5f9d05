//! Busboard server binary.
//!
//! Loads configuration, builds the departure board, and serves the REST
//! endpoint, the `WebSocket` push channel, and the browser client until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `busboard.yaml` plus environment overrides
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the configured time zone
//! 4. Build the departure board over the schedule file
//! 5. Check the schedule once and report the result
//! 6. Serve until `Ctrl-C`

use std::sync::Arc;

use busboard_core::{BoardConfig, Clock, DepartureBoard, ScheduleStore, parse_zone};
use busboard_server::{AppState, ServerConfig, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the time zone is
/// unknown, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. The log level comes from it, so this runs
    //    before logging is up.
    let config_path = BoardConfig::path_from_env();
    let config = BoardConfig::load_from(&config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("busboard starting");
    info!(
        config_file = %config_path.display(),
        config_file_found = config_path.exists(),
        schedule = %config.schedule.path.display(),
        zone = config.time.zone,
        static_dir = %config.server.static_dir.display(),
        "Configuration loaded"
    );

    // 3. Resolve the time zone. An unknown name is fatal.
    let zone = parse_zone(&config.time.zone)?;

    // 4. Build the board.
    let store = ScheduleStore::file(&config.schedule.path);
    let board = DepartureBoard::new(store, Clock::System, zone);

    // 5. The file is re-read on every request, so a bad schedule is
    //    reported but does not stop the server.
    match board.next_departures().await {
        Ok(rows) => info!(lines = rows.len(), "Schedule check passed"),
        Err(e) => warn!(error = %e, "Schedule check failed, requests will fail until it is fixed"),
    }

    // 6. Serve.
    let state = Arc::new(AppState::new(board, config.server.static_dir.clone()));
    start_server(&ServerConfig::from(&config.server), state).await?;

    info!("busboard shutdown complete");
    Ok(())
}
