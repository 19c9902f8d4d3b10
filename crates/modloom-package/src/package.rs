//! Installed packages

use crate::manifest::PackageManifest;
use crate::range::VersionRange;
use crate::validator::Validator;
use crate::{PackageError, Result};
use modloom_paths as paths;
use semver::Version;
use std::collections::{BTreeMap, BTreeSet};

/// Suffix that turns an asset into a patch script for the asset it names
pub const PATCH_SUFFIX: &str = ".patch";

/// A dependency edge of an installed package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyConstraint {
    pub range: VersionRange,
    pub optional: bool,
}

/// A structured patch script shipped by a package
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatchSource {
    /// Asset the script applies to, relative to the host asset root
    pub target: String,
    /// Script location, relative to the package asset directory
    pub script: String,
}

/// A discovered package
///
/// Directory fields are logical `/`-separated paths relative to the host
/// filesystem base.
#[derive(Debug, Clone)]
pub struct Package {
    pub id: String,
    pub version: Version,
    pub dependencies: BTreeMap<String, DependencyConstraint>,
    pub base_dir: String,
    pub asset_root: String,
    /// Assets replacing host assets of the same relative path
    pub overrides: BTreeSet<String>,
    pub patch_sources: Vec<PatchSource>,
    pub manifest: PackageManifest,
    /// Set by the resolver; excluded packages stay installed for diagnostics
    included: bool,
}

impl Package {
    /// Build a package from a validated manifest located in `base_dir`
    pub fn from_manifest(base_dir: &str, manifest: PackageManifest) -> Result<Self> {
        if let Err(problems) = Validator::validate(&manifest) {
            return Err(PackageError::InvalidManifest {
                id: manifest.id.clone(),
                problems,
            });
        }

        let version = Version::parse(&manifest.version)?;
        let mut dependencies = BTreeMap::new();
        for (id, dep) in &manifest.dependencies {
            dependencies.insert(
                id.clone(),
                DependencyConstraint {
                    range: VersionRange::parse(dep.version_constraint())?,
                    optional: dep.is_optional(),
                },
            );
        }

        let base_dir = paths::normalize(base_dir);
        let asset_root = paths::jail_relative(&base_dir, manifest.assets_dir());

        let mut package = Self {
            id: manifest.id.clone(),
            version,
            dependencies,
            base_dir,
            asset_root,
            overrides: BTreeSet::new(),
            patch_sources: Vec::new(),
            manifest,
            included: false,
        };
        if let Some(assets) = package.manifest.assets.clone() {
            package.set_assets(assets);
        }
        Ok(package)
    }

    /// Classify asset paths into overrides and patch scripts
    ///
    /// Paths are relative to the package asset directory and clamped to it.
    pub fn set_assets<I, S>(&mut self, assets: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.overrides.clear();
        self.patch_sources.clear();

        for asset in assets {
            let asset = paths::strip_root(&paths::normalize(&format!("/{}", asset.as_ref())))
                .to_string();
            if asset.is_empty() {
                continue;
            }
            match asset.strip_suffix(PATCH_SUFFIX) {
                Some(target) if !target.is_empty() && !target.ends_with('/') => {
                    self.patch_sources.push(PatchSource {
                        target: target.to_string(),
                        script: asset.clone(),
                    });
                }
                _ => {
                    self.overrides.insert(asset);
                }
            }
        }
        self.patch_sources.sort();
    }

    /// Path of a file inside the package directory; `..` cannot escape it
    pub fn resolve_path(&self, path: &str) -> String {
        paths::jail_relative(&self.base_dir, path)
    }

    /// Path of an asset inside the package asset directory
    pub fn asset_path(&self, asset: &str) -> String {
        paths::jail_relative(&self.asset_root, asset)
    }

    pub fn has_override(&self, asset: &str) -> bool {
        self.overrides.contains(asset)
    }

    /// Whether the last resolution kept this package in the load set
    pub fn is_included(&self) -> bool {
        self.included
    }

    pub(crate) fn set_included(&mut self, included: bool) {
        self.included = included;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Dependency;

    fn package(id: &str) -> Package {
        let manifest = PackageManifest::new(id, "1.0.0")
            .with_dependency("base", Dependency::Simple("^2.0.0".to_string()));
        Package::from_manifest("assets/mods/example", manifest).unwrap()
    }

    #[test]
    fn test_from_manifest() {
        let pkg = package("example");
        assert_eq!(pkg.version, Version::new(1, 0, 0));
        assert_eq!(pkg.asset_root, "assets/mods/example/assets");
        assert!(!pkg.dependencies["base"].optional);
    }

    #[test]
    fn test_invalid_manifest() {
        let manifest = PackageManifest::new("no spaces allowed", "1.0.0");
        let result = Package::from_manifest("mods/x", manifest);
        assert!(matches!(result, Err(PackageError::InvalidManifest { .. })));
    }

    #[test]
    fn test_paths_stay_inside_package() {
        let pkg = package("example");
        assert_eq!(
            pkg.resolve_path("../../../etc/passwd"),
            "assets/mods/example/etc/passwd"
        );
        assert_eq!(
            pkg.asset_path("/data/x.json"),
            "assets/mods/example/assets/data/x.json"
        );
    }

    #[test]
    fn test_classifies_assets() {
        let mut pkg = package("example");
        pkg.set_assets([
            "data/database.json",
            "/data/items.json.patch",
            "./media/../media/icon.png",
            "",
        ]);

        assert_eq!(
            pkg.overrides.iter().cloned().collect::<Vec<_>>(),
            vec!["data/database.json".to_string(), "media/icon.png".to_string()]
        );
        assert_eq!(
            pkg.patch_sources,
            vec![PatchSource {
                target: "data/items.json".to_string(),
                script: "data/items.json.patch".to_string(),
            }]
        );
    }
}
