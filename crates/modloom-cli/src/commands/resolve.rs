//! Show where a logical path leads (modloom resolve)

use crate::boot::Session;
use anyhow::Result;
use modloom_config::Config;
use modloom_resources::ResolveOptions;

pub fn run(config: Config, path: &str, no_overrides: bool) -> Result<()> {
    let session = Session::boot(config)?;
    let resources = session.resources()?;

    let options = ResolveOptions {
        allow_overrides: !no_overrides,
    };
    let resolved = resources.resolve(path, &options)?;

    println!("{}", resolved.concrete);
    match &resolved.package {
        Some(id) if resolved.is_host_asset => tracing::info!("'{}' overridden by '{}'", resolved.logical, id),
        Some(id) => tracing::info!("served by package '{}'", id),
        None => tracing::debug!("host asset '{}'", resolved.logical),
    }
    Ok(())
}
