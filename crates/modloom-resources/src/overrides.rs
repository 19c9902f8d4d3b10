//! Asset override table
//!
//! Packages replace host assets by shipping a file at the same relative path.
//! When several included packages override one asset, the package earliest
//! in load order wins.

use modloom_package::Package;
use std::collections::BTreeMap;

/// A package offering a replacement for a host asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideCandidate {
    pub package_id: String,
    /// Concrete path of the replacement
    pub concrete: String,
}

/// Several packages overriding the same asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideConflict {
    pub path: String,
    /// Contenders in load order; the first one is used
    pub packages: Vec<String>,
}

impl OverrideConflict {
    pub fn winner(&self) -> &str {
        self.packages.first().map(String::as_str).unwrap_or_default()
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        format!(
            "Conflict between '{}' found for '{}'. Taking '{}'",
            self.packages.join("', '"),
            self.path,
            self.winner()
        )
    }
}

#[derive(Debug, Default)]
pub struct AssetOverrides {
    table: BTreeMap<String, Vec<OverrideCandidate>>,
}

impl AssetOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the overrides of `package`; call in load order
    pub fn add_package(&mut self, package: &Package) {
        for asset in &package.overrides {
            self.table
                .entry(asset.clone())
                .or_default()
                .push(OverrideCandidate {
                    package_id: package.id.clone(),
                    concrete: package.asset_path(asset),
                });
        }
    }

    /// Winning override for a canonical asset path
    pub fn get(&self, path: &str) -> Option<&OverrideCandidate> {
        self.table.get(path).and_then(|candidates| candidates.first())
    }

    pub fn conflicts(&self) -> Vec<OverrideConflict> {
        self.table
            .iter()
            .filter(|(_, candidates)| candidates.len() > 1)
            .map(|(path, candidates)| OverrideConflict {
                path: path.clone(),
                packages: candidates.iter().map(|c| c.package_id.clone()).collect(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
