//! Package manifest validation

use crate::manifest::{Dependency, PackageManifest};
use crate::range::VersionRange;
use std::collections::BTreeMap;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid package id format
    InvalidPackageId(String),
    /// Invalid version
    InvalidVersion(String),
    /// Invalid dependency specification
    InvalidDependency { name: String, reason: String },
    /// Invalid asset path
    InvalidAsset { path: String, reason: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidPackageId(id) => {
                write!(f, "Invalid package id: {}", id)
            }
            ValidationError::InvalidVersion(version) => {
                write!(f, "Invalid version: {}", version)
            }
            ValidationError::InvalidDependency { name, reason } => {
                write!(f, "Invalid dependency '{}': {}", name, reason)
            }
            ValidationError::InvalidAsset { path, reason } => {
                write!(f, "Invalid asset '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Package manifest validator
pub struct Validator;

impl Validator {
    /// Validate package manifest
    pub fn validate(manifest: &PackageManifest) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_package_id(&manifest.id) {
            errors.push(e);
        }

        if let Err(e) = semver::Version::parse(&manifest.version) {
            errors.push(ValidationError::InvalidVersion(format!(
                "'{}': {}",
                manifest.version, e
            )));
        }

        errors.extend(Self::validate_dependencies(&manifest.dependencies));

        if let Some(assets) = &manifest.assets {
            errors.extend(assets.iter().filter_map(|path| {
                path.is_empty().then(|| ValidationError::InvalidAsset {
                    path: path.clone(),
                    reason: "asset path cannot be empty".to_string(),
                })
            }));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Ids are non-empty and made of ASCII letters, digits, `-` and `_`
    pub fn validate_package_id(id: &str) -> Result<(), ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::InvalidPackageId(
                "Package id cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidPackageId(format!(
                "'{}' contains invalid characters (only letters, digits, -, _ allowed)",
                id
            )));
        }

        Ok(())
    }

    fn validate_dependencies(deps: &BTreeMap<String, Dependency>) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (name, dep) in deps {
            if let Err(e) = Self::validate_package_id(name) {
                errors.push(ValidationError::InvalidDependency {
                    name: name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }

            if let Err(e) = VersionRange::parse(dep.version_constraint()) {
                errors.push(ValidationError::InvalidDependency {
                    name: name.clone(),
                    reason: format!("invalid version range '{}': {}", dep.version_constraint(), e),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::DetailedDependency;

    #[test]
    fn test_valid_manifest() {
        let manifest = PackageManifest::new("Cool_Mod-2", "0.4.0")
            .with_dependency("base", Dependency::Simple("^1.0.0".to_string()));
        assert!(Validator::validate(&manifest).is_ok());
    }

    #[test]
    fn test_invalid_ids() {
        assert!(Validator::validate_package_id("").is_err());
        assert!(Validator::validate_package_id("has space").is_err());
        assert!(Validator::validate_package_id("dots.are.bad").is_err());
        assert!(Validator::validate_package_id("UPPER-and_lower1").is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let manifest = PackageManifest::new("bad id", "one").with_dependency(
            "dep",
            Dependency::Detailed(DetailedDependency {
                version: "!!".to_string(),
                optional: None,
            }),
        );

        let errors = Validator::validate(&manifest).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidPackageId(_)));
        assert!(matches!(errors[1], ValidationError::InvalidVersion(_)));
        assert!(matches!(errors[2], ValidationError::InvalidDependency { .. }));
    }
}
