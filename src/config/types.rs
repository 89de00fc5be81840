//! Configuration types.
//!
//! These structures are deserialized from the YAML files in a
//! configuration directory.

use serde::Deserialize;

use crate::models::Strategy;

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (e.g. "0.0.0.0").
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Strategies applied when a receipt or preview omits them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyDefaults {
    /// Default tax strategy.
    #[serde(default)]
    pub tax_strategy: Strategy,
    /// Default tip strategy.
    #[serde(default)]
    pub tip_strategy: Strategy,
}

/// The contents of `app.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Strategy defaults.
    #[serde(default)]
    pub defaults: StrategyDefaults,
}

/// The contents of `export.yaml`: settings for building ledger expenses.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// ISO currency code attached to every expense.
    pub currency_code: String,
    /// Description used when a receipt has no merchant name.
    pub default_description: String,
    /// External ledger group to file expenses under, if any.
    #[serde(default)]
    pub group_id: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            currency_code: "USD".to_string(),
            default_description: "Receipt from ReceiptSplit".to_string(),
            group_id: None,
        }
    }
}

/// The complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    settings: AppSettings,
    export: ExportConfig,
}

impl AppConfig {
    /// Creates a configuration from its parts.
    pub fn new(settings: AppSettings, export: ExportConfig) -> Self {
        Self { settings, export }
    }

    /// Returns the HTTP listener settings.
    pub fn server(&self) -> &ServerConfig {
        &self.settings.server
    }

    /// Returns the logging settings.
    pub fn logging(&self) -> &LoggingConfig {
        &self.settings.logging
    }

    /// Returns the strategy defaults.
    pub fn defaults(&self) -> &StrategyDefaults {
        &self.settings.defaults
    }

    /// Returns the ledger export settings.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}
