//! Modloom package management
//!
//! Manifests, version ranges, discovery and the dependency resolver that
//! turns the installed packages into an ordered load set.

pub mod discovery;
pub mod load_order;
pub mod manifest;
pub mod package;
pub mod range;
pub mod resolver;
pub mod state;
pub mod validator;

pub use discovery::{DirectorySource, Discovery, DiscoveryError, PackageSource};
pub use load_order::{LoadOrderComputer, LoadOrderError};
pub use manifest::{Dependency, DetailedDependency, LocalizedString, PackageManifest, Person};
pub use package::{DependencyConstraint, Package, PatchSource, PATCH_SUFFIX};
pub use range::VersionRange;
pub use resolver::{verify_dependencies, Exclusion, ExclusionReason};
pub use state::{
    DependencyTarget, LoaderState, VirtualKind, VirtualPackage, LOADER_ID, LOADER_VERSION,
};
pub use validator::{ValidationError, Validator};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid manifest for '{id}': {}", list_problems(.problems))]
    InvalidManifest {
        id: String,
        problems: Vec<ValidationError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Semver error: {0}")]
    SemverError(#[from] semver::Error),

    #[error("Package '{0}' is already installed")]
    DuplicatePackage(String),

    #[error("Package id '{0}' is reserved for a virtual package")]
    ReservedId(String),
}

fn list_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PackageError>;
