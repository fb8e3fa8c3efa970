use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use server::handlers::http::build_router;
use server::{AppState, serve};
use shared::config::{load_or_default, parse_config};

/// Music link feed server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "MUSIC_FEED_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    let addr = config.server.addr();
    let backend_url = config.backend.resolved_url();

    let state = AppState::from_config(config)?;
    let router = Arc::new(build_router());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{} (backend {})", addr, backend_url);

    #[cfg(unix)]
    spawn_reload_handler(state.clone(), args.config.clone());

    serve(listener, state, router, shutdown_signal()).await?;

    info!("Server closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Re-read the config file on SIGHUP. An invalid file keeps the running config.
#[cfg(unix)]
fn spawn_reload_handler(state: AppState, path: Option<String>) {
    use tokio::signal::unix::{SignalKind, signal};

    let Some(path) = path else {
        return;
    };

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!("SIGHUP reload unavailable: {}", e);
                return;
            }
        };

        while hangup.recv().await.is_some() {
            info!("SIGHUP received, reloading {}", path);
            let reloaded = tokio::fs::read_to_string(&path)
                .await
                .map_err(anyhow::Error::from)
                .and_then(|contents| parse_config(&contents).map_err(anyhow::Error::from));

            match reloaded {
                Ok(config) => {
                    state.config.reload(config).await;
                    info!("Configuration reloaded");
                }
                Err(e) => warn!("Reload failed, keeping current configuration: {:#}", e),
            }
        }
    });
}
