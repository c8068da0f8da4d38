use std::sync::Arc;

use anyhow::Context;
use moviefinder_catalog::TmdbClient;
use moviefinder_core::images::ImageResolver;
use moviefinder_db::KvStore;
use moviefinder_server::config::ServerConfig;
use moviefinder_server::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    info!(db_path = %config.db_path, "connecting to database");

    let pool = moviefinder_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    moviefinder_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    if !config.has_tmdb_credentials() {
        warn!("no TMDB credentials set (MOVIEFINDER_TMDB_KEY or MOVIEFINDER_TMDB_TOKEN); catalog calls will fail");
    }
    let catalog = Arc::new(TmdbClient::new(config.tmdb.clone()));

    let app_state = AppState::new(KvStore::new(pool), catalog, ImageResolver::default())
        .await
        .context("failed to load favorites")?;
    info!(
        favorites = app_state.favorites.lock().await.len(),
        "favorites loaded"
    );

    let app = moviefinder_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
