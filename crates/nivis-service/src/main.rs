//! Runs the id generators as a foreground process until Ctrl-C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use nivis_service::{Algorithm, IdManager, ServiceConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(version, about = "Local snowflake-style id generation service")]
struct Args {
    /// Path to the JSON deployment config (data_center_id, service_id).
    #[arg(long, env = "NIVIS_CONFIG", default_value = "nivis.json")]
    config: PathBuf,

    /// Resume the counter algorithm from a previously issued value.
    #[arg(long)]
    counter_start: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let config = ServiceConfig::from_path(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    info!(
        "Loaded config: data_center_id={}, service_id={}",
        config.data_center_id, config.service_id
    );

    let mut manager = IdManager::new(&config)?;
    if let Some(start) = args.counter_start {
        manager = manager.starting_counter_at(start);
    }

    for algorithm in Algorithm::ALL {
        let id = manager.generate(algorithm)?;
        info!("Generator `{algorithm}` online, first id {id}");
    }

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    manager.run(shutdown).await?;
    info!("Id service stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Completes when the process receives Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
