//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading service
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{SettleError, SettleResult};

use super::types::{AppConfig, AppSettings, ExportConfig};

/// Loads and provides access to service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── app.yaml     # Listener, logging and strategy defaults
/// └── export.yaml  # Ledger export settings
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns `ConfigNotFound` if either file is missing and
    /// `ConfigParseError` if either contains invalid YAML or lacks a
    /// required field.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use receipt_split::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), receipt_split::error::SettleError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> SettleResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<AppSettings>(&path.join("app.yaml"))?;
        let export = Self::load_yaml::<ExportConfig>(&path.join("export.yaml"))?;

        Ok(Self {
            config: AppConfig::new(settings, export),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> SettleResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| SettleError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| SettleError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Strategy;

    fn write_config_dir(name: &str, app: Option<&str>, export: Option<&str>) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("receipt_split_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        if let Some(app) = app {
            fs::write(dir.join("app.yaml"), app).unwrap();
        }
        if let Some(export) = export {
            fs::write(dir.join("export.yaml"), export).unwrap();
        }
        dir
    }

    const APP_YAML: &str = r#"
server:
  host: "0.0.0.0"
  port: 3000
logging:
  level: "debug"
defaults:
  tax_strategy: PROPORTIONAL
  tip_strategy: EQUAL
"#;

    const EXPORT_YAML: &str = r#"
currency_code: "USD"
default_description: "Receipt from ReceiptSplit"
"#;

    #[test]
    fn test_load_shipped_config() {
        let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
        let config = loader.config();

        assert_eq!(config.export().currency_code, "USD");
        assert_eq!(config.defaults().tax_strategy, Strategy::Proportional);
    }

    #[test]
    fn test_load_valid_directory() {
        let dir = write_config_dir("valid", Some(APP_YAML), Some(EXPORT_YAML));
        let loader = ConfigLoader::load(&dir).unwrap();

        assert_eq!(loader.config().server().port, 3000);
        assert_eq!(loader.config().logging().level, "debug");
        assert_eq!(loader.config().defaults().tip_strategy, Strategy::Equal);
        assert_eq!(loader.config().export().group_id, None);
    }

    #[test]
    fn test_missing_export_file_is_config_not_found() {
        let dir = write_config_dir("missing", Some(APP_YAML), None);
        let err = ConfigLoader::load(&dir).unwrap_err();

        match err {
            SettleError::ConfigNotFound { path } => assert!(path.ends_with("export.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = write_config_dir("invalid", Some("server: [unclosed"), Some(EXPORT_YAML));
        let err = ConfigLoader::load(&dir).unwrap_err();

        assert!(matches!(err, SettleError::ConfigParseError { .. }));
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let app = APP_YAML.replace("tip_strategy: EQUAL", "tip_strategy: RANDOM");
        let dir = write_config_dir("strategy", Some(&app), Some(EXPORT_YAML));

        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(SettleError::ConfigParseError { .. })
        ));
    }
}
