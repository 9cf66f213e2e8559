//! Backend entry-point: loads settings, prepares the store and serves the
//! voting API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use vote_backend::inbound::http::health::HealthState;
use vote_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use vote_backend::settings::AppSettings;

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn connect(settings: &AppSettings, database_url: &str) -> std::io::Result<DbPool> {
    run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    let mut pool_config = PoolConfig::new(database_url);
    if let Some(size) = settings.database_pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    DbPool::new(pool_config).await.map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let mut config = ServerConfig::from_settings(&settings).map_err(std::io::Error::other)?;
    if let Some(database_url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect(&settings, database_url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting server");
    let result = create_server(health_state.clone(), config)?.await;
    health_state.mark_unhealthy();
    result
}
