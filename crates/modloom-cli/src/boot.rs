//! Boot sequence: configuration, discovery, resolution, resource pipeline

use anyhow::{Context, Result};
use modloom_config::{Config, ConfigLoader, ModSettings};
use modloom_package::{DirectorySource, DiscoveryError, LoaderState, PackageSource};
use modloom_resources::{FsHost, LangFallbackPatcher, Resources, ResourcesBuilder};
use std::path::Path;
use std::sync::Arc;

/// Load modloom.toml, either the given file or the nearest one above the working directory
pub fn load_config(config_file: Option<&Path>) -> Result<Config> {
    let loader = ConfigLoader::new();
    match config_file {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read the working directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load configuration")
        }
    }
}

pub fn load_settings(config: &Config) -> Result<ModSettings> {
    let path = config.settings_file()?;
    ModSettings::load(&path)
        .with_context(|| format!("Failed to read mod settings {}", path.display()))
}

/// A resolved loader session
pub struct Session {
    pub config: Config,
    pub state: LoaderState,
    pub discovery_errors: Vec<DiscoveryError>,
}

impl Session {
    pub fn boot(config: Config) -> Result<Self> {
        let settings = load_settings(&config)?;
        let source = DirectorySource::new(
            config.base_dir(),
            config.mods_dirs(),
            config.manifest_file(),
        );
        let discovery = source.discover_packages();

        let mut state = LoaderState::new(
            config.host_id(),
            config.host_version()?,
            config.runtime_package(),
        );
        for package in discovery.packages {
            let id = package.id.clone();
            if let Err(error) = state.install(package) {
                tracing::warn!("Skipping package '{}': {}", id, error);
            }
        }

        let disabled: Vec<String> = state
            .installed()
            .filter(|package| !settings.is_enabled(&package.id))
            .map(|package| package.id.clone())
            .collect();
        for id in &disabled {
            state.set_enabled(id, false);
        }

        state.resolve()?;

        Ok(Self {
            config,
            state,
            discovery_errors: discovery.errors,
        })
    }

    /// Resource pipeline over the loaded packages, reading from the config root
    pub fn resources(&self) -> Result<Resources> {
        let host = Arc::new(FsHost::new(self.config.base_dir()));
        let mut builder = ResourcesBuilder::new(host)
            .scheme(self.config.scheme())
            .host_root(self.config.host_assets_dir());
        builder.add_load_set(&self.state);

        if self.config.lang_fallback() {
            LangFallbackPatcher::register(&mut builder, self.config.default_locale())?;
        }
        Ok(builder.build())
    }
}
