//! Package discovery on the filesystem
//!
//! Every sub-directory of a mods directory that holds a manifest is a package.
//! Failures are collected per package so one broken mod never hides the others.

use crate::manifest::PackageManifest;
use crate::package::Package;
use crate::PackageError;
use modloom_paths as paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load package at {path}: {source}")]
    Package {
        path: PathBuf,
        #[source]
        source: PackageError,
    },

    #[error("Failed to scan assets of '{id}': {source}")]
    Assets {
        id: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Package '{id}' at {second} is shadowed by {first}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
}

/// Outcome of a discovery run
#[derive(Debug, Default)]
pub struct Discovery {
    pub packages: Vec<Package>,
    pub errors: Vec<DiscoveryError>,
}

/// Something that can enumerate installed packages
pub trait PackageSource {
    fn discover_packages(&self) -> Discovery;
}

/// Discovers packages below mods directories on disk
#[derive(Debug, Clone)]
pub struct DirectorySource {
    /// Filesystem directory that logical paths are relative to
    base: PathBuf,
    /// Logical mods directories, searched in order
    mods_dirs: Vec<String>,
    manifest_file: String,
}

impl DirectorySource {
    pub fn new(base: impl Into<PathBuf>, mods_dirs: Vec<String>, manifest_file: &str) -> Self {
        Self {
            base: base.into(),
            mods_dirs,
            manifest_file: manifest_file.to_string(),
        }
    }

    fn fs_path(&self, logical: &str) -> PathBuf {
        self.base.join(logical)
    }

    fn scan_mods_dir(&self, mods_dir: &str, discovery: &mut Discovery) {
        let dir = self.fs_path(mods_dir);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("mods directory {} does not exist", dir.display());
                return;
            }
            Err(source) => {
                discovery.errors.push(DiscoveryError::Io { path: dir, source });
                return;
            }
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) if entry.path().is_dir() => {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
                Ok(_) => {}
                Err(source) => discovery.errors.push(DiscoveryError::Io {
                    path: dir.clone(),
                    source,
                }),
            }
        }
        names.sort();

        for name in names {
            let base_dir = paths::join(&[mods_dir, name.as_str()]);
            let manifest_path = self.fs_path(&base_dir).join(&self.manifest_file);
            if !manifest_path.is_file() {
                tracing::debug!("skipping {}: no {}", base_dir, self.manifest_file);
                continue;
            }
            match self.load_package(&base_dir, &manifest_path) {
                Ok(package) => discovery.packages.push(package),
                Err(error) => {
                    tracing::warn!("{}", error);
                    discovery.errors.push(error);
                }
            }
        }
    }

    fn load_package(&self, base_dir: &str, manifest_path: &Path) -> Result<Package, DiscoveryError> {
        let manifest = PackageManifest::from_file(manifest_path).map_err(|source| {
            DiscoveryError::Package {
                path: manifest_path.to_path_buf(),
                source,
            }
        })?;
        let mut package =
            Package::from_manifest(base_dir, manifest).map_err(|source| DiscoveryError::Package {
                path: manifest_path.to_path_buf(),
                source,
            })?;

        if package.manifest.assets.is_none() {
            let assets = scan_assets(&self.fs_path(&package.asset_root)).map_err(|source| {
                DiscoveryError::Assets {
                    id: package.id.clone(),
                    source,
                }
            })?;
            package.set_assets(assets);
        }

        Ok(package)
    }
}

impl PackageSource for DirectorySource {
    fn discover_packages(&self) -> Discovery {
        let mut discovery = Discovery::default();
        for mods_dir in &self.mods_dirs {
            self.scan_mods_dir(mods_dir, &mut discovery);
        }

        let mut first_seen: HashMap<String, String> = HashMap::new();
        let mut packages = Vec::with_capacity(discovery.packages.len());
        for package in std::mem::take(&mut discovery.packages) {
            if let Some(first) = first_seen.get(&package.id) {
                let error = DiscoveryError::DuplicateId {
                    id: package.id.clone(),
                    first: first.clone(),
                    second: package.base_dir.clone(),
                };
                tracing::warn!("{}", error);
                discovery.errors.push(error);
                continue;
            }
            first_seen.insert(package.id.clone(), package.base_dir.clone());
            packages.push(package);
        }
        discovery.packages = packages;

        tracing::debug!(
            "discovered {} packages ({} errors)",
            discovery.packages.len(),
            discovery.errors.len()
        );
        discovery
    }
}

/// All files below `root` as sorted `/`-separated relative paths
///
/// A missing assets directory means a package without assets.
fn scan_assets(root: &Path) -> Result<Vec<String>, walkdir::Error> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            assets.push(parts.join("/"));
        }
    }
    Ok(assets)
}
