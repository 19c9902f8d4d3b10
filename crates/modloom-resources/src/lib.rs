//! Modloom resource pipeline
//!
//! Resolves logical asset paths against the host asset root, package-scheme
//! paths and package overrides, then loads documents and images with every
//! registered patch applied in load order.

pub mod document;
pub mod generated;
pub mod hooks;
pub mod host;
pub mod image;
pub mod lang;
pub mod overrides;
pub mod patch_list;
pub mod patcher;
pub mod pipeline;
pub mod scheme;

pub use document::{merge_into, DocumentPatcher, MergePatchEngine, PatchOrigin, PatchScriptEngine, ScriptLoader};
pub use generated::{DocumentGenerator, GeneratedDocuments};
pub use hooks::ModuleHooks;
pub use host::{FsHost, Host};
pub use image::{Image, ImageError, PixelBuffer};
pub use lang::LangFallbackPatcher;
pub use overrides::{AssetOverrides, OverrideCandidate, OverrideConflict};
pub use patch_list::{PatchList, PathMatcher};
pub use patcher::{patch_fn, take_aux, Aux, FnPatcher, PatchContext, Patcher};
pub use pipeline::{
    BufferMode, LoadOptions, ResolveOptions, ResolvedPath, Resources, ResourcesBuilder,
};
pub use scheme::{SchemeError, SchemePath};

use modloom_paths as paths;
use thiserror::Error;

/// Error type of host collaborators and patch handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Invalid '{scheme}://' path '{path}': {reason}")]
    InvalidSchemePath {
        scheme: String,
        path: String,
        reason: SchemeError,
    },

    #[error("Failed to load '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to parse JSON file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to convert image '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: ImageError,
    },

    #[error("Failed to patch '{path}': {source}")]
    Patch {
        path: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Canonical host-relative form of an asset path
///
/// `/x.json`, `x.json` and `./a/../x.json` all map to `x.json`; `..` never
/// climbs above the root.
pub fn asset_key(path: &str) -> String {
    paths::strip_root(&paths::normalize(&format!("/{}", path))).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key() {
        assert_eq!(asset_key("/x.json"), "x.json");
        assert_eq!(asset_key("x.json"), "x.json");
        assert_eq!(asset_key("./a/../x.json"), "x.json");
        assert_eq!(asset_key("../../etc/passwd"), "etc/passwd");
        assert_eq!(asset_key("data//maps/"), "data/maps");
    }
}
