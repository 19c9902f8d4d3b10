//! Persisted mod settings (mod-settings.json)
//!
//! Stores per-mod flags across sessions. Format:
//! `{ "version": 1, "data": { "<mod id>": { "enabled": true } } }`.
//! A mod without an entry is enabled.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// Settings of a single mod
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModEntry {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileData {
    version: u32,
    #[serde(default)]
    data: BTreeMap<String, ModEntry>,
}

/// In-memory view of the settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModSettings {
    path: Option<PathBuf>,
    data: BTreeMap<String, ModEntry>,
}

impl ModSettings {
    /// Settings that are never persisted; every mod is enabled
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read settings from `path`. A missing file yields empty settings bound to `path`.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut settings = Self {
            path: Some(path.to_path_buf()),
            data: BTreeMap::new(),
        };

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no mod settings at {}, using defaults", path.display());
                return Ok(settings);
            }
            Err(e) => return Err(e.into()),
        };

        let file: FileData =
            serde_json::from_str(&raw).map_err(|error| ConfigError::SettingsParseError {
                file: path.to_path_buf(),
                error,
            })?;
        if file.version != FORMAT_VERSION {
            return Err(ConfigError::UnsupportedSettingsVersion(file.version));
        }

        settings.data = file.data;
        Ok(settings)
    }

    /// Write settings back to the file they were loaded from
    pub fn save(&self) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = FileData {
            version: FORMAT_VERSION,
            data: self.data.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|error| {
            ConfigError::SettingsParseError {
                file: path.clone(),
                error,
            }
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.data.get(id).map_or(true, |entry| entry.enabled)
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        self.data
            .entry(id.to_string())
            .and_modify(|entry| entry.enabled = enabled)
            .or_insert(ModEntry { enabled });
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ModEntry)> {
        self.data.iter().map(|(id, entry)| (id.as_str(), entry))
    }
}
