//! Loader Configuration File (modloom.toml)
//!
//! Every field is optional; [`crate::Config`] supplies the defaults.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parsed modloom.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Where assets and mods are found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderSection>,

    /// The host application, exposed to mods as a virtual package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<HostSection>,

    /// Lang file fallback patching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<LangSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LoaderSection {
    /// Root of the host's own assets (default: "assets")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_assets_dir: Option<String>,

    /// Directories scanned for mods (default: ["assets/mods"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mods_dirs: Option<Vec<String>>,

    /// Scheme of package-relative asset paths (default: "mod")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// Id of the loader's runtime package, always loaded first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_package: Option<String>,

    /// Name of the manifest file inside each mod directory (default: "mod.json")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_file: Option<String>,

    /// Location of the persisted mod settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Host version (semver)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LangSection {
    /// Locale whose lang files act as the fallback (default: "en_US")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    /// Merge every locale's lang files over the default locale (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl ConfigFile {
    /// Parse from TOML source
    pub fn parse(content: &str, file: &Path) -> ConfigResult<Self> {
        let config: ConfigFile =
            toml::from_str(content).map_err(|error| ConfigError::TomlParseError {
                file: file.to_path_buf(),
                error,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file on disk
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Check values that TOML typing alone cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(version) = self.host.as_ref().and_then(|h| h.version.as_deref()) {
            semver::Version::parse(version)
                .map_err(|e| ConfigError::InvalidVersion(format!("{}: {}", version, e)))?;
        }

        if let Some(loader) = &self.loader {
            if let Some(scheme) = &loader.scheme {
                if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ConfigError::InvalidValue {
                        field: "loader.scheme".to_string(),
                        reason: format!("'{}' must be a non-empty alphanumeric word", scheme),
                    });
                }
            }
            if let Some(dirs) = &loader.mods_dirs {
                if dirs.iter().any(|d| d.is_empty()) {
                    return Err(ConfigError::InvalidValue {
                        field: "loader.mods-dirs".to_string(),
                        reason: "directory path cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
