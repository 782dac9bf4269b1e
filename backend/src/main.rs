//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use helpdesk::inbound::http::health::HealthState;
use helpdesk::inbound::http::session_config::{BuildMode, SessionSettings, key_fingerprint};
use helpdesk::inbound::http::state::HttpState;
use helpdesk::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use helpdesk::settings::AppSettings;
use server::{ServerConfig, build_http_state, create_server};

fn init_tracing() {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
}

async fn connect_database(url: &str, max_connections: u32) -> color_eyre::Result<DbPool> {
    run_pending_migrations(url)
        .await
        .wrap_err("failed to apply database migrations")?;
    DbPool::new(PoolConfig::new(url).with_max_size(max_connections))
        .await
        .wrap_err("failed to build database pool")
}

async fn seed_demo_accounts(state: &web::Data<HttpState>) -> color_eyre::Result<()> {
    let report = state
        .demo_accounts
        .seed(None)
        .await
        .map_err(|error| eyre!("demo account seeding failed: {error}"))?;
    info!(
        created = report.created(),
        total = report.accounts.len(),
        "demo accounts ensured"
    );
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    let session = SessionSettings::from_env(&DefaultEnv::new(), BuildMode::current())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");

    let mut config = ServerConfig::new(session, settings.bind_addr(), settings.storage_root());
    if let Some(url) = settings.database_url() {
        let pool = connect_database(url, settings.db_max_connections()).await?;
        config = config.with_db_pool(pool);
    }

    let http_state = build_http_state(&config).wrap_err("failed to open attachment storage")?;
    if settings.demo_accounts_on_startup {
        seed_demo_accounts(&http_state).await?;
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting helpdesk server");
    create_server(health_state, http_state, config)?.await?;
    Ok(())
}
