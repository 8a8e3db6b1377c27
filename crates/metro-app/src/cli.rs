//! CLI argument definitions for the metro skill runner.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// metro: answer one voice-skill request envelope with live train arrivals.
#[derive(Parser, Debug)]
#[command(name = "metro", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory holding the attribute database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Transit API key.
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Keep user attributes in memory instead of SQLite.
    #[arg(long = "memory-store")]
    pub memory_store: bool,

    /// Request envelope JSON file. Reads stdin when absent or `-`.
    pub request: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > METRO_CONFIG env var > ~/.metro-minutes/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("METRO_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the transit API key.
    ///
    /// Priority: --api-key flag > METRO_API_KEY env var.
    /// Returns `None` if neither is set (use config value).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        std::env::var("METRO_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
    }

    /// Resolve the data directory path.
    ///
    /// Priority: --data-dir flag > METRO_DATA_DIR env var.
    /// Returns `None` if neither is set (use config value).
    pub fn resolve_data_dir(&self) -> Option<String> {
        if let Some(ref p) = self.data_dir {
            return Some(p.to_string_lossy().to_string());
        }
        std::env::var("METRO_DATA_DIR").ok().filter(|d| !d.is_empty())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Request file, or `None` for stdin.
    pub fn request_path(&self) -> Option<&PathBuf> {
        self.request.as_ref().filter(|p| p.as_os_str() != "-")
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".metro-minutes").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".metro-minutes").join("config.toml");
    }
    PathBuf::from("config.toml")
}
