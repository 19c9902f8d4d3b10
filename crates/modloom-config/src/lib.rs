//! Modloom Configuration System
//!
//! Provides configuration management for the loader:
//! - Loader configuration (modloom.toml)
//! - Environment variable overrides (MODLOOM_*)
//! - Persisted per-mod settings (mod-settings.json)
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Loader config (./modloom.toml, searched upwards from the start directory)
//! 3. Environment variables (MODLOOM_*)
//!
//! # Example
//!
//! ```no_run
//! use modloom_config::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::new().load_from_directory(Path::new(".")).unwrap();
//! println!("mods live in {:?}", config.mods_dirs());
//! ```

pub mod file;
pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid settings file {file}: {error}")]
    SettingsParseError {
        file: PathBuf,
        error: serde_json::Error,
    },

    #[error("Unsupported settings format version '{0}'")]
    UnsupportedSettingsVersion(u32),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invalid semver version: {0}")]
    InvalidVersion(String),

    #[error("Data directory not found")]
    DataDirNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use file::{ConfigFile, HostSection, LangSection, LoaderSection};
pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME};
pub use settings::{ModEntry, ModSettings};
