//! Schema bootstrap for the actor service.
//!
//! Connects with the same configuration the library uses and applies the
//! migrations, so a fresh database is ready before any service starts.

use actor_service::config::Config;
use actor_service::repositories::{apply_migrations, connect_pool};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actor_service=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let pool = connect_pool(&config).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    apply_migrations(&pool).await.map_err(|e| {
        error!("Failed to apply migrations: {}", e);
        e
    })?;

    info!("Schema is up to date");
    pool.close().await;

    Ok(())
}
