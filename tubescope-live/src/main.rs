//! tubescope-live - Live video search server
//!
//! Serves the WebSocket session endpoint and the one-shot search API, backed
//! by the supervised worker mesh and the two scoring services.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescope_common::config::{load_toml_or_default, resolve_config_path};
use tubescope_live::catalog::YouTubeCatalog;
use tubescope_live::config::{TomlConfig, CONFIG_ENV_VAR, MODULE_NAME};
use tubescope_live::mesh::{spawn_ticker, Supervisor, SupervisorEvent};
use tubescope_live::pipeline::EnrichmentPipeline;
use tubescope_live::scoring::spawn_default_services;
use tubescope_live::{build_router, AppState};

/// Command-line arguments for tubescope-live
#[derive(Parser, Debug)]
#[command(name = "tubescope-live")]
#[command(about = "Live video search with readability and sentiment enrichment")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long, env = "TUBESCOPE_BIND")]
    bind: Option<String>,

    /// Catalog API key, overrides the config file and TUBESCOPE_API_KEY
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: it carries the fallback log level
    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, MODULE_NAME);
    let mut config: TomlConfig = load_toml_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;
    config.apply_env_overrides();
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(key) = args.api_key {
        config.catalog.api_key = Some(key);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tubescope-live v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => info!("No config file location, using defaults"),
    }

    config.validate().context("Invalid configuration")?;
    if config.catalog.api_key.is_none() {
        warn!("No catalog API key configured; searches will fail until one is set");
    }

    let mesh = &config.mesh;
    info!(
        refresh_period_secs = mesh.refresh_period_secs,
        max_restarts = mesh.max_restarts,
        restart_window_secs = mesh.restart_window_secs,
        ask_timeout_ms = mesh.ask_timeout_ms,
        detail_failure = ?mesh.detail_failure,
        "Mesh settings"
    );

    // Scoring services and catalog
    let directory = spawn_default_services(mesh.mailbox_capacity).await;
    let catalog = YouTubeCatalog::new(&config.catalog).context("Failed to create catalog client")?;
    let pipeline = EnrichmentPipeline::from_settings(Arc::new(catalog), directory, mesh);

    // Mesh
    let (supervisor, events) = Supervisor::spawn(pipeline.clone(), mesh);
    tokio::spawn(log_supervisor_events(events));

    let shutdown = CancellationToken::new();
    let ticker = spawn_ticker(supervisor.clone(), mesh.refresh_period(), shutdown.clone());

    let state = AppState::new(supervisor, pipeline, mesh);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("tubescope-live listening on http://{}", config.bind_address);
    info!("Live endpoint: ws://{}/ws", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Err(e) = ticker.await {
        warn!("Ticker task ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Owner side of supervisor escalation
async fn log_supervisor_events(mut events: mpsc::UnboundedReceiver<SupervisorEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SupervisorEvent::Escalated { id, fault } => {
                error!(connection = %id, %fault, "Worker fault escalated; connection will receive no further results");
            }
            SupervisorEvent::WorkerStopped { id, fault: Some(fault) } => {
                warn!(connection = %id, %fault, "Worker stopped by policy");
            }
            other => tracing::debug!(event = ?other, "Supervisor event"),
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
