//! Enable or disable a mod (modloom enable / modloom disable)

use crate::boot::load_settings;
use anyhow::Result;
use modloom_config::Config;
use modloom_package::{DirectorySource, PackageSource};

pub fn run(config: Config, id: &str, enabled: bool) -> Result<()> {
    let source = DirectorySource::new(
        config.base_dir(),
        config.mods_dirs(),
        config.manifest_file(),
    );
    if !source
        .discover_packages()
        .packages
        .iter()
        .any(|package| package.id == id)
    {
        tracing::warn!("package '{}' is not installed; storing the setting anyway", id);
    }

    let mut settings = load_settings(&config)?;
    settings.set_enabled(id, enabled);
    settings.save()?;

    let state = if enabled { "enabled" } else { "disabled" };
    println!("{} {}", state, id);
    Ok(())
}
