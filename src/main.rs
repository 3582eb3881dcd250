//! Operator console server
//!
//! Serves the monitoring & auth core over HTTP. Backed by in-memory
//! stores by default; production deployments wire their own `LogStore`
//! and `TenantDirectory` implementations behind the same traits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opsconsole::api::build_app;
use opsconsole::config::ConsoleConfig;
use opsconsole::directory::MemoryTenantDirectory;
use opsconsole::email::TracingEmailDelivery;
use opsconsole::monitoring::MemoryLogStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "opsconsole")]
#[command(version)]
#[command(about = "Operator console monitoring & auth core")]
struct Cli {
    /// Configuration file path (.json)
    #[arg(short, long, env = "OPSCONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the console HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "opsconsole=debug,tower_http=debug"
    } else {
        "opsconsole=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConsoleConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
    }
}

async fn serve(config: ConsoleConfig) -> Result<()> {
    let app = build_app(
        &config,
        Arc::new(MemoryLogStore::new()),
        Arc::new(MemoryTenantDirectory::new()),
        Arc::new(TracingEmailDelivery),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(addr = %addr, "Operator console listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
