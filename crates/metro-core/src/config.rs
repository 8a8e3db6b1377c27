use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MetroError, Result};

/// Top-level configuration for metro-minutes.
///
/// Loaded from `~/.metro-minutes/config.toml` by default. Every section falls
/// back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetroConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub transit: TransitConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl MetroConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MetroConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    ///
    /// The load error is handed back rather than logged, since this runs
    /// before any subscriber is installed.
    pub fn load_or_default(path: &Path) -> (Self, Option<MetroError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MetroError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check the values that would otherwise fail late, at request time.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.transit.base_url.trim();
        if base_url.is_empty() {
            return Err(MetroError::Config("transit.base_url must not be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(MetroError::Config(format!(
                "transit.base_url must use http:// or https://, got: {}",
                base_url
            )));
        }
        if self.transit.request_timeout_secs == Some(0) {
            return Err(MetroError::Config(
                "transit.request_timeout_secs must be greater than zero".into(),
            ));
        }

        let table = &self.persistence.table;
        let valid_table = !table.is_empty()
            && table
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_table {
            return Err(MetroError::Config(format!(
                "persistence.table must be a plain identifier, got: {:?}",
                table
            )));
        }

        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the attribute database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.metro-minutes/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote transit-prediction service settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    /// Root URL of the rail API, without a trailing path.
    pub base_url: String,
    /// Key sent in the `api_key` header. Opaque to the application.
    pub api_key: String,
    /// Per-request timeout. Absent means the caller's deadline applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.wmata.com".to_string(),
            api_key: String::new(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for TransitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("TransitConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &key)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Which durable store backs persistent attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Durable per-user attribute store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackend,
    /// Database file name, relative to `general.data_dir`.
    pub database_file: String,
    /// Table holding one attribute document per user.
    pub table: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::Sqlite,
            database_file: "attributes.db".to_string(),
            table: "user_attributes".to_string(),
        }
    }
}
