//! Loader state: installed packages, virtual packages and the resolved load set

use crate::load_order::{LoadOrderComputer, LoadOrderError};
use crate::package::Package;
use crate::resolver::{self, Exclusion};
use crate::{PackageError, Result};
use indexmap::IndexMap;
use semver::Version;
use std::collections::{BTreeSet, HashMap};

/// Id under which the loader itself can be depended on
pub const LOADER_ID: &str = "modloom";

/// Version of the loader virtual package: this crate's version
pub const LOADER_VERSION: Version = Version::new(
    version_component(env!("CARGO_PKG_VERSION_MAJOR")),
    version_component(env!("CARGO_PKG_VERSION_MINOR")),
    version_component(env!("CARGO_PKG_VERSION_PATCH")),
);

const fn version_component(digits: &str) -> u64 {
    let bytes = digits.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u64;
        i += 1;
    }
    value
}

/// Dependency targets that are not installed packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKind {
    /// The host application
    Host,
    /// The mod loader
    Loader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPackage {
    pub kind: VirtualKind,
    pub id: String,
    pub version: Version,
}

/// Result of looking an id up as a dependency target
#[derive(Debug, Clone, Copy)]
pub enum DependencyTarget<'a> {
    Virtual(&'a VirtualPackage),
    Installed(&'a Package),
    Missing,
}

/// Owned state of one loader session
#[derive(Debug)]
pub struct LoaderState {
    /// Installed packages; in load order once resolved
    packages: IndexMap<String, Package>,
    virtual_packages: Vec<VirtualPackage>,
    runtime_id: String,
    disabled: BTreeSet<String>,
    exclusions: Vec<Exclusion>,
    resolved: bool,
}

impl LoaderState {
    /// State with the host and loader virtual packages
    pub fn new(host_id: &str, host_version: Version, runtime_id: &str) -> Self {
        Self {
            packages: IndexMap::new(),
            virtual_packages: vec![
                VirtualPackage {
                    kind: VirtualKind::Host,
                    id: host_id.to_string(),
                    version: host_version,
                },
                VirtualPackage {
                    kind: VirtualKind::Loader,
                    id: LOADER_ID.to_string(),
                    version: LOADER_VERSION,
                },
            ],
            runtime_id: runtime_id.to_string(),
            disabled: BTreeSet::new(),
            exclusions: Vec::new(),
            resolved: false,
        }
    }

    /// Add a discovered package
    pub fn install(&mut self, package: Package) -> Result<()> {
        if self.virtual_package(&package.id).is_some() {
            return Err(PackageError::ReservedId(package.id));
        }
        if self.packages.contains_key(&package.id) {
            return Err(PackageError::DuplicatePackage(package.id));
        }
        self.packages.insert(package.id.clone(), package);
        self.resolved = false;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) {
        if enabled {
            self.disabled.remove(id);
        } else {
            self.disabled.insert(id.to_string());
        }
        self.resolved = false;
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.contains(id)
    }

    pub fn virtual_package(&self, id: &str) -> Option<&VirtualPackage> {
        self.virtual_packages.iter().find(|v| v.id == id)
    }

    pub fn virtual_packages(&self) -> &[VirtualPackage] {
        &self.virtual_packages
    }

    /// Look up a dependency target among virtual and installed packages
    pub fn lookup(&self, id: &str) -> DependencyTarget<'_> {
        if let Some(virtual_package) = self.virtual_package(id) {
            return DependencyTarget::Virtual(virtual_package);
        }
        match self.packages.get(id) {
            Some(package) => DependencyTarget::Installed(package),
            None => DependencyTarget::Missing,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    /// Installed packages, in load order once resolved
    pub fn installed(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Included packages in load order; empty until [`LoaderState::resolve`] succeeds
    pub fn load_set(&self) -> impl Iterator<Item = &Package> {
        self.packages.values().filter(|p| p.is_included())
    }

    /// Included package by id
    pub fn loaded(&self, id: &str) -> Option<&Package> {
        self.packages.get(id).filter(|p| p.is_included())
    }

    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn runtime_id(&self) -> &str {
        &self.runtime_id
    }

    /// Order the installed packages and compute the load set
    ///
    /// On a cycle the state is left exactly as it was.
    pub fn resolve(&mut self) -> std::result::Result<(), LoadOrderError> {
        let order = LoadOrderComputer::new(&self.runtime_id, self.packages.values())
            .compute_load_order()?;

        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let rank = |id: &String| position.get(id.as_str()).copied().unwrap_or(usize::MAX);
        self.packages.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));

        let (loaded, exclusions) = resolver::compute_load_set(self);
        for package in self.packages.values_mut() {
            package.set_included(loaded.contains(&package.id));
        }
        self.exclusions = exclusions;
        self.resolved = true;

        tracing::info!(
            "resolved {} of {} installed packages",
            loaded.len(),
            self.packages.len()
        );
        Ok(())
    }
}
