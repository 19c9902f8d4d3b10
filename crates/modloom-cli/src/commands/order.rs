//! Print the load order (modloom order)

use crate::boot::Session;
use anyhow::Result;
use modloom_config::Config;
use serde_json::json;

pub fn run(config: Config, json: bool) -> Result<()> {
    let session = Session::boot(config)?;
    let state = &session.state;

    if json {
        let order: Vec<_> = state
            .load_set()
            .map(|package| json!({ "id": package.id, "version": package.version.to_string() }))
            .collect();
        let excluded: Vec<_> = state
            .exclusions()
            .iter()
            .map(|exclusion| json!({ "id": exclusion.id, "reason": exclusion.to_string() }))
            .collect();
        let errors: Vec<_> = session
            .discovery_errors
            .iter()
            .map(|error| error.to_string())
            .collect();
        let output = json!({ "order": order, "excluded": excluded, "errors": errors });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for virtual_package in state.virtual_packages() {
        println!("  {} {} (virtual)", virtual_package.id, virtual_package.version);
    }
    for (index, package) in state.load_set().enumerate() {
        println!("{:>3}. {} {}", index + 1, package.id, package.version);
    }
    if !state.exclusions().is_empty() {
        println!();
        for exclusion in state.exclusions() {
            let report = exclusion.report();
            print!("{}", report);
            if !report.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
