use anyhow::{Context, Result};
use catalogue::config::AppConfig;
use catalogue::storage::database::DatabaseStorage;
use catalogue::storage::memory::MemoryStorage;
use catalogue::storage::ProductStorage;
use catalogue::{web, Catalogue};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalogue=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match config.database_url() {
        Some(database_url) => {
            let storage = DatabaseStorage::new(database_url, *config.database_max_connections())
                .await
                .context("Failed to connect to the database")?;
            info!("Using database storage");
            serve(&config, storage).await
        }
        None => {
            warn!("DATABASE_URL not set; products are kept in memory only");
            serve(&config, MemoryStorage::new()).await
        }
    }
}

async fn serve<S: ProductStorage>(config: &AppConfig, storage: S) -> Result<()> {
    let app = web::router(Arc::new(Catalogue::new(storage)));

    let address = config.bind_address()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}
