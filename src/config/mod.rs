//! Configuration loading for the receipt settlement service.
//!
//! Configuration lives in a directory of YAML files: `app.yaml` for the
//! listener, logging and strategy defaults, `export.yaml` for ledger export.
//!
//! # Example
//!
//! ```no_run
//! use receipt_split::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Listening on {}", loader.config().server().bind_address());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, AppSettings, ExportConfig, LoggingConfig, ServerConfig, StrategyDefaults,
};
