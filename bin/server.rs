// Zero Waste Kitchen - Web Server

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use zero_waste_kitchen::api::{router, AppState};
use zero_waste_kitchen::{logging, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init_logger(config.log_json);

    let store = SqliteStore::open(&config.db_path)?;
    let dishes = store.dish_count()?;
    let pantries = store.pantry_count()?;
    info!(db_path = %config.db_path.display(), dishes, pantries, "Database opened");

    let state = AppState::new(Arc::new(store), config.expiry_window());
    let app = router(state);

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    info!(
        %address,
        window_days = config.expiry_window_days,
        "Server running, try GET /api/suggest_dishes/<user_id>"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
