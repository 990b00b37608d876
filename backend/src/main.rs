//! Service entry-point: loads settings, prepares the store and runs the
//! HTTP server.

mod server;

use std::ffi::OsString;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use library_backend::inbound::http::health::HealthState;
use library_backend::outbound::persistence::{DbPool, run_pending_migrations};
use library_backend::settings::LibrarySettings;

use server::{ServerConfig, create_server};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn migrate(database_url: String) -> std::io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|err| io_error("migration task failed", err))?
        .map_err(|err| io_error("database migration failed", err))?;
    info!(applied, "database schema is up to date");
    Ok(())
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("library")
        .endpoint("/metrics")
        .build()
        .map_err(|err| io_error("configure Prometheus metrics", err))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args: Vec<OsString> = std::env::args_os().collect();
    let settings = LibrarySettings::load_from_iter(args)
        .map_err(|err| io_error("failed to load settings", err))?;
    let policy = settings
        .lending_policy()
        .map_err(|err| io_error("invalid lending policy", err))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io_error("invalid bind address", err))?;

    let mut config = ServerConfig::new(bind_addr, policy);
    if let Some(pool_config) = settings.pool_config() {
        if settings.skip_migrations {
            info!("skipping database migrations");
        } else {
            migrate(pool_config.database_url().to_owned()).await?;
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(|err| io_error("failed to build connection pool", err))?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(make_metrics()?));
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting library lending service");
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
