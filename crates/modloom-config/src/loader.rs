//! Configuration Loader
//!
//! Handles locating modloom.toml and merging it with environment overrides.

use crate::file::{ConfigFile, HostSection, LoaderSection};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// File name searched for when loading from a directory
pub const CONFIG_FILE_NAME: &str = "modloom.toml";

const DEFAULT_HOST_ASSETS_DIR: &str = "assets";
const DEFAULT_MODS_DIR: &str = "assets/mods";
const DEFAULT_SCHEME: &str = "mod";
const DEFAULT_RUNTIME_PACKAGE: &str = "modloom-runtime";
const DEFAULT_MANIFEST_FILE: &str = "mod.json";
const DEFAULT_HOST_ID: &str = "host";
const DEFAULT_HOST_VERSION: &str = "1.0.0";
const DEFAULT_LOCALE: &str = "en_US";

/// Configuration loader
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. modloom.toml
/// 3. Environment variables (MODLOOM_*)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip MODLOOM_* variables (used by tests and embedders)
    ignore_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from modloom.toml, with environment overrides applied
    pub file: ConfigFile,

    /// Directory containing modloom.toml; relative paths are based here
    pub root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Loader that does not consult the process environment
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find modloom.toml. When none is found the
    /// defaults are used with `start_dir` as the root.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let mut current = start_dir.to_path_buf();

        let (root, file) = loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                break (current, ConfigFile::load_from_file(&config_path)?);
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break (start_dir.to_path_buf(), ConfigFile::default()),
            }
        };

        self.finish(file, Some(root))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let file = ConfigFile::load_from_file(config_path)?;
        let root = config_path.parent().map(|p| p.to_path_buf());
        self.finish(file, root)
    }

    fn finish(&self, file: ConfigFile, root: Option<PathBuf>) -> ConfigResult<Config> {
        let file = if self.ignore_env {
            file
        } else {
            self.apply_env_overrides(file)?
        };
        file.validate()?;
        tracing::debug!("loaded configuration rooted at {:?}", root);
        Ok(Config { file, root })
    }

    /// Apply environment variable overrides
    ///
    /// Recognized: MODLOOM_HOST_ASSETS_DIR, MODLOOM_MODS_DIRS (`:`-separated),
    /// MODLOOM_HOST_VERSION, MODLOOM_SETTINGS_FILE.
    fn apply_env_overrides(&self, mut file: ConfigFile) -> ConfigResult<ConfigFile> {
        if let Ok(dir) = env::var("MODLOOM_HOST_ASSETS_DIR") {
            file.loader
                .get_or_insert_with(LoaderSection::default)
                .host_assets_dir = Some(dir);
        }

        if let Ok(dirs) = env::var("MODLOOM_MODS_DIRS") {
            let dirs: Vec<String> = dirs
                .split(':')
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
            file.loader.get_or_insert_with(LoaderSection::default).mods_dirs = Some(dirs);
        }

        if let Ok(version) = env::var("MODLOOM_HOST_VERSION") {
            semver::Version::parse(&version).map_err(|e| ConfigError::InvalidValue {
                field: "MODLOOM_HOST_VERSION".to_string(),
                reason: e.to_string(),
            })?;
            file.host.get_or_insert_with(HostSection::default).version = Some(version);
        }

        if let Ok(path) = env::var("MODLOOM_SETTINGS_FILE") {
            file.loader
                .get_or_insert_with(LoaderSection::default)
                .settings_file = Some(PathBuf::from(path));
        }

        Ok(file)
    }
}

impl Config {
    fn loader(&self) -> Option<&LoaderSection> {
        self.file.loader.as_ref()
    }

    /// Directory relative config paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn host_assets_dir(&self) -> &str {
        self.loader()
            .and_then(|l| l.host_assets_dir.as_deref())
            .unwrap_or(DEFAULT_HOST_ASSETS_DIR)
    }

    pub fn mods_dirs(&self) -> Vec<String> {
        self.loader()
            .and_then(|l| l.mods_dirs.clone())
            .unwrap_or_else(|| vec![DEFAULT_MODS_DIR.to_string()])
    }

    pub fn scheme(&self) -> &str {
        self.loader()
            .and_then(|l| l.scheme.as_deref())
            .unwrap_or(DEFAULT_SCHEME)
    }

    pub fn runtime_package(&self) -> &str {
        self.loader()
            .and_then(|l| l.runtime_package.as_deref())
            .unwrap_or(DEFAULT_RUNTIME_PACKAGE)
    }

    pub fn manifest_file(&self) -> &str {
        self.loader()
            .and_then(|l| l.manifest_file.as_deref())
            .unwrap_or(DEFAULT_MANIFEST_FILE)
    }

    pub fn host_id(&self) -> &str {
        self.file
            .host
            .as_ref()
            .and_then(|h| h.id.as_deref())
            .unwrap_or(DEFAULT_HOST_ID)
    }

    /// Host version; validated when the configuration was loaded
    pub fn host_version(&self) -> ConfigResult<semver::Version> {
        let version = self
            .file
            .host
            .as_ref()
            .and_then(|h| h.version.as_deref())
            .unwrap_or(DEFAULT_HOST_VERSION);
        semver::Version::parse(version)
            .map_err(|e| ConfigError::InvalidVersion(format!("{}: {}", version, e)))
    }

    /// Settings file path: configured value, or `<data dir>/modloom/mod-settings.json`
    pub fn settings_file(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = self.loader().and_then(|l| l.settings_file.as_ref()) {
            return Ok(if path.is_absolute() {
                path.clone()
            } else {
                self.base_dir().join(path)
            });
        }
        let data_dir = dirs::data_dir().ok_or(ConfigError::DataDirNotFound)?;
        Ok(data_dir.join("modloom").join("mod-settings.json"))
    }

    pub fn default_locale(&self) -> &str {
        self.file
            .lang
            .as_ref()
            .and_then(|l| l.default_locale.as_deref())
            .unwrap_or(DEFAULT_LOCALE)
    }

    pub fn lang_fallback(&self) -> bool {
        self.file
            .lang
            .as_ref()
            .and_then(|l| l.fallback)
            .unwrap_or(true)
    }
}
