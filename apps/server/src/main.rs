//! Rollcall Server binary.

use std::{net::SocketAddr, sync::Arc};

use document_store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
use rollcall_server::{config::Config, create_app, create_state, init_tracing};

async fn serve<S: DocumentStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let state = create_state(config.clone(), Arc::new(store))?;

    let corrector = if config.date_correction {
        // Entries written by other processes since the last run
        match state.corrector.backfill_all().await {
            Ok(corrected) => tracing::info!(corrected, "Filled in missing attendance dates"),
            Err(e) => tracing::warn!(error = %e, "Startup date correction failed"),
        }
        Some(state.corrector.watch())
    } else {
        None
    };

    let app = create_app(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = corrector {
        task.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        time_zone = %config.time_zone,
        persistent = config.database_url.is_some(),
        date_correction = config.date_correction,
        "Starting Rollcall Server"
    );

    match config.database_url.clone() {
        Some(url) => {
            let store = SqliteDocumentStore::connect(&url).await?;
            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, attendance is kept in memory only");
            serve(config, MemoryDocumentStore::new()).await
        }
    }
}
