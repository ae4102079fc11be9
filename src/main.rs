//! Tasks API Server
//!
//! A REST API for managing tasks, backed by a single JSON snapshot file.

use anyhow::Result;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Arc;
use tasks_api::cli::Cli;
use tasks_api::config::Config;
use tasks_api::http;
use tasks_api::store::JsonFileStore;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Load configuration, then apply CLI overrides
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(data) = &cli.data {
        config.server.data_path = data.into();
    }

    config.ensure_data_dir()?;

    info!("Starting Tasks API v{}", env!("CARGO_PKG_VERSION"));
    info!("Data file: {:?}", config.server.data_path);

    let store = Arc::new(JsonFileStore::new(config.server.data_path.clone()));
    let (shutdown_tx, _addr) = http::start_server(store, config.server.port).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(());

    Ok(())
}
