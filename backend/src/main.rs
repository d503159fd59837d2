//! Orders API entry-point: loads settings, applies migrations and serves the
//! REST endpoints.

mod server;

use std::ffi::OsString;
use std::io;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orders_api::inbound::http::health::HealthState;
use orders_api::outbound::persistence::{DbPool, run_pending_migrations};
use orders_api::settings::AppSettings;

use server::{ServerConfig, create_server, drain_on_shutdown};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Load settings from `args` layered over files and `ORDERS_API_*` variables.
fn load_settings<I, T>(args: I) -> io::Result<AppSettings>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    AppSettings::load_from_iter(args).map_err(|err| io::Error::other(err.to_string()))
}

/// Application bootstrap.
///
/// Migrations run on a blocking connection before the Actix system starts.
fn main() -> io::Result<()> {
    init_tracing();

    let settings = load_settings(std::env::args_os())?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    if settings.run_migrations()
        && let Some(url) = settings.database_url.as_deref()
    {
        let applied = run_pending_migrations(url).map_err(io::Error::other)?;
        info!(applied, "database migrations complete");
    }

    actix_web::rt::System::new().block_on(async move {
        let mut config = ServerConfig::new(bind_addr);
        if let Some(pool_config) = settings.pool_config() {
            let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }

        let health_state = web::Data::new(HealthState::new());
        let server = create_server(health_state.clone(), config)?;
        actix_web::rt::spawn(drain_on_shutdown(health_state, server.handle()));
        info!(%bind_addr, "orders API listening");
        server.await
    })
}
