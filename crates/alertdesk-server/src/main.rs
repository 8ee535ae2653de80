use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use alertdesk_server::app;
use alertdesk_server::config::{ServerConfig, StorageBackend};
use alertdesk_server::sample_seed;
use alertdesk_server::state::AppState;
use alertdesk_storage::{AlertStore, MemoryAlertStore, SeaOrmAlertStore};

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  alertdesk-server [config.toml]     Start the server (default: config/server.toml)");
    eprintln!("  alertdesk-server --help            Show this message");
}

#[tokio::main]
async fn main() -> Result<()> {
    alertdesk_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("alertdesk=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

/// Loads the config, falling back to defaults when the file does not exist.
fn load_config(config_path: &str) -> Result<ServerConfig> {
    if Path::new(config_path).exists() {
        ServerConfig::load(config_path)
            .with_context(|| format!("Failed to load config '{config_path}'"))
    } else {
        tracing::warn!(path = %config_path, "Config file not found, using defaults");
        Ok(ServerConfig::default())
    }
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn AlertStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory alert store");
            Ok(Arc::new(MemoryAlertStore::new()))
        }
        StorageBackend::Database => {
            let url = config.storage.connection_url();
            let store = SeaOrmAlertStore::new(&url, Path::new(&config.storage.data_dir))
                .await
                .with_context(|| {
                    format!("Failed to open alert database {}", config.storage.redacted_url())
                })?;
            Ok(Arc::new(store))
        }
    }
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        backend = config.storage.backend.as_str(),
        db = %config.storage.redacted_url(),
        "alertdesk-server starting"
    );

    let store = open_store(&config).await?;
    let state = AppState::new(store, config.clone());

    if config.seed_sample_alerts {
        if let Err(e) = sample_seed::init_sample_alerts(state.store.as_ref(), &state.lifecycle).await
        {
            tracing::error!(error = %e, "Failed to seed sample alerts");
        }
    }

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;

    tracing::info!(addr = %http_addr, "HTTP server listening");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("alertdesk-server stopped");
    Ok(())
}
