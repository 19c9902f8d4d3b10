//! Package-scheme asset paths: `<scheme>://<package id>/<path>`

use std::fmt;

/// Why a package-scheme path was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeError {
    Empty,
    MissingSeparator,
    EmptyPackageId,
    EmptyPath,
    UnknownPackage(String),
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeError::Empty => write!(f, "the URI is empty"),
            SchemeError::MissingSeparator => write!(f, "'/' after the package id is missing"),
            SchemeError::EmptyPackageId => write!(f, "the package id is empty"),
            SchemeError::EmptyPath => write!(f, "the file path is empty"),
            SchemeError::UnknownPackage(id) => write!(f, "package '{}' not found", id),
        }
    }
}

impl std::error::Error for SchemeError {}

/// A parsed package-scheme path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemePath<'a> {
    pub package_id: &'a str,
    pub path: &'a str,
}

impl<'a> SchemePath<'a> {
    /// Parse `path` if it carries the `<scheme>://` prefix
    ///
    /// Returns `None` for paths without the prefix. Whether the package exists
    /// is up to the caller.
    pub fn parse(scheme: &str, path: &'a str) -> Option<Result<Self, SchemeError>> {
        let uri = path.strip_prefix(scheme)?.strip_prefix("://")?;
        Some(Self::parse_uri(uri))
    }

    fn parse_uri(uri: &'a str) -> Result<Self, SchemeError> {
        if uri.is_empty() {
            return Err(SchemeError::Empty);
        }
        let (package_id, path) = uri.split_once('/').ok_or(SchemeError::MissingSeparator)?;
        if package_id.is_empty() {
            return Err(SchemeError::EmptyPackageId);
        }
        if path.is_empty() {
            return Err(SchemeError::EmptyPath);
        }
        Ok(Self { package_id, path })
    }
}
