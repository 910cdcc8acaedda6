//! # dashconfd: dashconf daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise `tracing`
//! - Construct the INI store, the user backend factory and the module
//!   manager (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Build the axum router and serve it until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use tracing_subscriber::EnvFilter;

use dashconf_adapter_http_axum::state::{AppState, Settings};
use dashconf_adapter_modules_fs::FsModuleManager;
use dashconf_adapter_store_ini::IniConfigStore;
use dashconf_adapter_users_sqlx::SqlxUserBackendFactory;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Adapters
    let store = IniConfigStore::new(&config.storage.config_dir);
    let modules = FsModuleManager::new(
        FsModuleManager::parse_search_path(&config.modules.path),
        &config.modules.enabled_dir,
    );

    // HTTP
    let state = AppState::new(
        store,
        SqlxUserBackendFactory,
        modules,
        Settings {
            remote_user_header: config.auth.remote_user_header.clone(),
            setup_enabled: config.setup.enabled,
        },
    );
    let app = dashconf_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        addr = %bind_addr,
        config_dir = %config.storage.config_dir.display(),
        setup = config.setup.enabled,
        "dashconfd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("dashconfd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
