//! Package manifest parsing and types (mod.json)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package manifest (mod.json)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub id: String,
    /// Semver version, checked by [`crate::Validator`]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<LocalizedString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<LocalizedString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Person>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Dependency>,
    /// Explicit asset list; when absent the assets directory is scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,

    // Lifecycle scripts. Carried for the host, never run by the loader core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prestart: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poststart: Option<String>,
}

impl PackageManifest {
    /// Parse manifest from JSON string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load manifest from file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize to JSON string
    pub fn to_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Manifest with only the required fields
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            title: None,
            description: None,
            license: None,
            homepage: None,
            keywords: Vec::new(),
            authors: Vec::new(),
            dependencies: BTreeMap::new(),
            assets: None,
            assets_dir: None,
            main: None,
            preload: None,
            postload: None,
            prestart: None,
            poststart: None,
        }
    }

    /// Builder-style dependency insertion
    pub fn with_dependency(mut self, id: impl Into<String>, dependency: Dependency) -> Self {
        self.dependencies.insert(id.into(), dependency);
        self
    }

    /// Assets directory relative to the package directory (default: "assets")
    pub fn assets_dir(&self) -> &str {
        self.assets_dir.as_deref().unwrap_or("assets")
    }
}

/// Plain text or a locale -> text map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocalizedString {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedString {
    /// Text for `locale`, falling back to `en_US` and then any translation
    pub fn get(&self, locale: &str) -> Option<&str> {
        match self {
            LocalizedString::Plain(s) => Some(s),
            LocalizedString::Localized(map) => map
                .get(locale)
                .or_else(|| map.get("en_US"))
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Person {
    Name(String),
    Details {
        name: LocalizedString,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<LocalizedString>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<LocalizedString>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<LocalizedString>,
    },
}

/// Dependency specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Dependency {
    /// Simple version range
    Simple(String),
    /// Detailed dependency
    Detailed(DetailedDependency),
}

impl Dependency {
    /// Get version range string
    pub fn version_constraint(&self) -> &str {
        match self {
            Dependency::Simple(v) => v,
            Dependency::Detailed(d) => &d.version,
        }
    }

    /// Check if dependency is optional
    pub fn is_optional(&self) -> bool {
        match self {
            Dependency::Simple(_) => false,
            Dependency::Detailed(d) => d.optional.unwrap_or(false),
        }
    }
}

/// Detailed dependency specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailedDependency {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}
