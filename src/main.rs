use anyhow::Result;
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod views;

use config::{AppConfig, Backend};
use store::{LocalObjectStore, ObjectStore, S3ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting bucket-notes with config: {:?}", cfg);

    if cfg.public_url.is_empty() {
        tracing::warn!("No public URL configured; file links will be relative");
    }

    // --- Initialize object store ---
    let store: Arc<dyn ObjectStore> = match cfg.backend {
        Backend::S3 => Arc::new(S3ObjectStore::from_config(&cfg).await),
        Backend::Local => {
            tokio::fs::create_dir_all(&cfg.local_dir).await?;
            tracing::info!("Serving local bucket directory {}", cfg.local_dir);
            Arc::new(LocalObjectStore::new(&cfg.local_dir))
        }
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state::AppState::new(store, &cfg));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
