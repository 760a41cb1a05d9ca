//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use std::path::Path;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use domain_allocation::inbound::http::health::HealthState;
use domain_allocation::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use domain_allocation::settings::AppSettings;
use server::{ServerConfig, SweepSchedule, create_server};

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

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let key = load_session_key(&settings)?;
    let policy = settings
        .expired_assignment_policy()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        key,
        settings.cookie_secure(),
        SameSite::Lax,
        settings.bind_addr(),
    )
    .with_retry_policy(settings.retry_policy())
    .with_seed_members(settings.seed_members().map_err(std::io::Error::other)?)
    .with_sweep(
        settings
            .sweep_interval()
            .map(|period| SweepSchedule { period, policy }),
    );

    if let Some(database_url) = settings.database_url.clone() {
        config = config.with_db_pool(connect_database(database_url, settings.db_pool_size).await?);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(make_metrics());
    }

    let health_state = web::Data::new(HealthState::new());
    let running = create_server(health_state.clone(), config)?;
    info!(bind_addr = %settings.bind_addr(), "listening");

    let result = running.server.await;
    health_state.mark_unhealthy();
    if let Some(sweeper) = running.sweeper {
        sweeper.abort();
    }
    result
}

async fn connect_database(database_url: String, pool_size: Option<u32>) -> std::io::Result<DbPool> {
    let migration_url = database_url.clone();
    tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;

    let mut pool_config = PoolConfig::new(database_url);
    if let Some(size) = pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    DbPool::new(pool_config).await.map_err(std::io::Error::other)
}

/// Read the session signing key, falling back to a random key in debug builds
/// or when ephemeral keys are explicitly allowed.
fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match read_key_file(&key_path) {
        Ok(key) => Ok(key),
        Err(e) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                )))
            }
        }
    }
}

fn read_key_file(path: &Path) -> std::io::Result<Key> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("session key path has no file name"))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let bytes = dir.read(file_name)?;
    Key::try_from(bytes.as_slice()).map_err(|e| std::io::Error::other(e.to_string()))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Option<actix_web_prom::PrometheusMetrics> {
    match PrometheusMetricsBuilder::new("domain_allocation")
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "metrics disabled: failed to build Prometheus middleware");
            None
        }
    }
}
