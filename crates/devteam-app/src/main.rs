//! DevTeam server binary
//!
//! Wires settings, driver, pool and HTTP server together. Startup is
//! fail-fast: a database that cannot be reached aborts the process with
//! an error instead of serving requests against an empty pool.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use devteam_connection::{ConnectionPool, DriverFactory};
use devteam_db::Database;
use devteam_drivers::DriverRegistry;
use devteam_server::AppState;
use devteam_settings::AppSettings;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Work-request management server
#[derive(Parser, Debug)]
#[command(name = "devteam", version, about)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "devteam.toml")]
    config: PathBuf,

    /// Bind address (overrides the settings file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides the settings file)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let mut settings = AppSettings::load(&args.config)?;
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let registry = DriverRegistry::with_defaults();
    let driver = registry.get(&settings.database.driver).ok_or_else(|| {
        anyhow!(
            "unknown database driver '{}' (available: {})",
            settings.database.driver,
            registry.list().join(", ")
        )
    })?;

    let factory = DriverFactory::new(driver, settings.database.connect_params());
    let pool = Arc::new(ConnectionPool::new(settings.pool.pool_config()?, factory));

    info!(
        host = %settings.database.host,
        database = %settings.database.database,
        "connecting to database"
    );
    pool.warm_up()
        .await
        .context("could not establish the initial database connections")?;

    let state = AppState::new(Database::new(pool));
    let addr = settings.server.addr()?;
    devteam_server::serve(state, addr, settings.server.request_timeout_secs).await
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
