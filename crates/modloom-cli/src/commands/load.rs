//! Print a patched document (modloom load)

use crate::boot::Session;
use anyhow::Result;
use modloom_config::Config;
use modloom_resources::LoadOptions;

pub async fn run(config: Config, path: &str, no_overrides: bool, compact: bool) -> Result<()> {
    let session = Session::boot(config)?;
    let resources = session.resources()?;

    let options = if no_overrides {
        LoadOptions::without_overrides()
    } else {
        LoadOptions::default()
    };
    let document = resources.load_json(path, &options).await?;

    if compact {
        println!("{}", serde_json::to_string(&document)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(())
}
