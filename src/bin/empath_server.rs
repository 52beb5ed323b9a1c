//! HTTP server binary for the empath chat backend.
//!
//! Usage: `empath-server [CONFIG_PATH]`. Without an argument the default
//! config path is used; a missing file means built-in defaults.

use std::path::PathBuf;
use std::sync::Arc;

use empath::{ChatServer, EmpathConfig, build_therapist};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(EmpathConfig::default_config_path);
    tracing::info!(path = %config_path.display(), "loading config");

    let config = EmpathConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;

    let therapist = Arc::new(build_therapist(&config)?);
    let server = ChatServer::start(therapist, &config.server).await?;
    tracing::info!(addr = %server.addr(), "empath-server ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();
    Ok(())
}
