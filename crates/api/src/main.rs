mod config;
mod error;
mod middleware;
mod routes;
mod state;
mod views;

use std::sync::Arc;

use buurt_core::intake::{LogMailer, Mailer, ResendMailer};
use buurt_core::store::{ContentStore, HttpStore, MemoryStore, PgStore};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    let config =
        AppConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting buurt site server");

    let store = open_store(&config).await?;
    let mailer = open_mailer(&config);

    let state = state::AppState::new(config.clone(), store, mailer);

    let app = routes::build_router(state)
        .layer(middleware::request_tracing::trace_layer())
        .layer(middleware::cors::cors_layer());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    Ok(match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("no DATABASE_URL or SANITY_PROJECT_ID set; content is kept in memory");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres {
            url,
            max_connections,
            min_connections,
        } => {
            let store = PgStore::connect(url, *max_connections, *min_connections)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
            tracing::info!("Using PostgreSQL content store");
            Arc::new(store)
        }
        StoreBackend::Hosted(hosted) => {
            tracing::info!(project_id = %hosted.project_id, dataset = %hosted.dataset, "Using hosted content API");
            Arc::new(HttpStore::new(hosted.clone()))
        }
    })
}

fn open_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    match &config.mail.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone())),
        None => {
            tracing::warn!("RESEND_API_KEY not set; contact messages are only logged");
            Arc::new(LogMailer)
        }
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
