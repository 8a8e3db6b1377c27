//! metro application binary - composition root.
//!
//! Ties the metro crates together into a single executable:
//! 1. Load configuration from TOML and apply CLI/env overrides
//! 2. Open the attribute store (SQLite or in-memory)
//! 3. Build the WMATA client and the skill dispatcher
//! 4. Read one request envelope, dispatch it, print the reply as JSON

mod cli;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use metro_client::WmataClient;
use metro_core::config::{MetroConfig, PersistenceBackend};
use metro_storage::{Database, InMemoryAttributeStore, PersistenceAdapter, SqliteAttributeStore};
use metro_skill::{Dispatcher, RequestEnvelope};

use cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

fn open_store(
    config: &MetroConfig,
    memory: bool,
) -> Result<Arc<dyn PersistenceAdapter>, Box<dyn std::error::Error>> {
    if memory || config.persistence.backend == PersistenceBackend::Memory {
        tracing::info!("Using in-memory attribute store");
        return Ok(Arc::new(InMemoryAttributeStore::new()));
    }

    let db_path = resolve_data_dir(&config.general.data_dir).join(&config.persistence.database_file);
    let db = Arc::new(Database::new(&db_path)?);
    let store = SqliteAttributeStore::new(db, &config.persistence.table)?;
    tracing::info!(
        path = %db_path.display(),
        table = %config.persistence.table,
        "SQLite attribute store opened"
    );
    Ok(Arc::new(store))
}

fn read_request(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = MetroConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(key) = args.resolve_api_key() {
        config.transit.api_key = key;
    }
    config.general.log_level = args.resolve_log_level(&config.general.log_level);

    // Tracing. Stdout carries only the response.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting metro v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }
    config.validate()?;

    // Storage and transit client.
    let store = open_store(&config, args.memory_store)?;
    let client = Arc::new(WmataClient::from_config(&config.transit)?);
    tracing::info!(base_url = %config.transit.base_url, "Transit client ready");

    let dispatcher = Dispatcher::builder()
        .with_persistence_adapter(store)
        .register_defaults(client)
        .build();

    // One request in, one reply out.
    let raw = match read_request(args.request_path().map(PathBuf::as_path)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request envelope");
            return Err(e.into());
        }
    };
    let envelope = RequestEnvelope::from_json(&raw)?;
    let reply = dispatcher.dispatch(&envelope).await;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
