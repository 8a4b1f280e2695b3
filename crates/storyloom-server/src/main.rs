//! Storyloom — story-writing assistant backend.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod context;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = storyloom_core::StoryloomConfig::from_env()?;
    let port = config.port;

    info!("Data directory: {}", config.data_dir.display());

    let store = storyloom_store::StoryStore::open(&config.db_path)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
    store
        .seed_defaults()
        .map_err(|e| anyhow::anyhow!("Failed to seed settings: {}", e))?;

    let state = Arc::new(AppState::new(config, store));

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Storyloom server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
