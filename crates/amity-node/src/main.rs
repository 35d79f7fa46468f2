//! Amity Node - friend request backend
//!
//! This binary runs the HTTP API with:
//! - Account signup, login and token refresh
//! - User search
//! - Friend requests: send, accept, reject and list

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use amity_core::config::LogFormat;
use amity_core::{NodeConfig, StorageBackend};
use amity_node::{server, AppState};

#[derive(Parser)]
#[command(name = "amity-node")]
#[command(about = "Friend request backend with account and search API")]
struct Args {
    /// Configuration file (JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// HTTP bind host
    #[arg(long)]
    host: Option<String>,

    /// HTTP port (0 = auto-assign)
    #[arg(long, short)]
    port: Option<u16>,

    /// Display name for this node
    #[arg(long, short)]
    name: Option<String>,

    /// Database path
    #[arg(long, env = "AMITY_DB")]
    db: Option<PathBuf>,

    /// Keep everything in memory instead of SQLite
    #[arg(long)]
    memory: bool,

    /// Token signing secret
    #[arg(long, env = "AMITY_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    /// Command line and environment values win over the file
    fn apply(&self, config: &mut NodeConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(name) = &self.name {
            config.server.name = name.clone();
        }
        if let Some(db) = &self.db {
            config.storage.database = db.clone();
        }
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
        if let Some(secret) = &self.secret {
            config.auth.secret = secret.clone();
        }
    }
}

fn init_logging(config: &NodeConfig, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Pretty => {
            let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => NodeConfig::from_file(path)?,
        None => NodeConfig::default(),
    };
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config, args.verbose)?;

    info!("Starting Amity Node: {}", config.server.name);
    config.validate()?;

    // Initialize store
    let store = amity_state::open_store(&config.storage).await?;
    if config.storage.backend == StorageBackend::Memory {
        warn!("In-memory store: all data is lost on exit");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store)?);

    // Periodically forget idle throttle buckets
    let sweep_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        loop {
            ticker.tick().await;
            sweep_state.throttle.sweep();
        }
    });

    // Start HTTP server - bind to requested port (0 = auto-assign)
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let actual_port = listener.local_addr()?.port();

    info!("═══════════════════════════════════════════════════════════");
    info!("  API listening on http://127.0.0.1:{}", actual_port);
    info!("  Signup: POST http://127.0.0.1:{}/signup/", actual_port);
    info!("  Health: http://127.0.0.1:{}/health", actual_port);
    info!("═══════════════════════════════════════════════════════════");

    let app = server::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Amity Node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
