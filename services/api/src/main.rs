use anyhow::Result;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod matching;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{config::Settings, middleware::AuthConfig, state::AppState};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting ride matching API");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    let auth = AuthConfig::from_env().map_err(anyhow::Error::msg)?;

    let app_state = AppState::from_pool(pool, settings.request_ttl(), auth);

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    info!(
        "API service listening on {} (request TTL {} minutes)",
        settings.bind_addr, settings.request_ttl_minutes
    );

    axum::serve(listener, app).await?;

    Ok(())
}
