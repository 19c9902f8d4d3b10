//! Path resolution and patched loading

use crate::document::{DocumentPatcher, MergePatchEngine, PatchScriptEngine};
use crate::generated::{DocumentGenerator, GeneratedDocuments};
use crate::host::Host;
use crate::image::{Image, PixelBuffer};
use crate::overrides::{AssetOverrides, OverrideConflict};
use crate::patch_list::{PatchList, PathMatcher};
use crate::patcher::{PatchContext, Patcher};
use crate::scheme::{SchemeError, SchemePath};
use crate::{asset_key, BoxError, ResourceError, Result};
use futures::future::try_join_all;
use indexmap::IndexMap;
use modloom_package::{LoaderState, Package};
use modloom_paths as paths;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Scheme used when none is configured
pub const DEFAULT_SCHEME: &str = "mod";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Consult the asset override table
    pub allow_overrides: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            allow_overrides: true,
        }
    }
}

/// Form of a loaded image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferMode {
    /// Always return pixels
    Always,
    /// Always return the encoded form
    Never,
    /// Return pixels only when a handler touched the image
    #[default]
    IfPatched,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub resolve: ResolveOptions,
    pub buffer_mode: BufferMode,
}

impl LoadOptions {
    pub fn without_overrides() -> Self {
        Self {
            resolve: ResolveOptions {
                allow_overrides: false,
            },
            ..Self::default()
        }
    }
}

/// Where a logical path leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path handed to the host
    pub concrete: String,
    /// Canonical host-relative path, or the scheme path as given
    pub logical: String,
    /// Host-relative asset; only these are patched
    pub is_host_asset: bool,
    /// Package serving the file (scheme path or override)
    pub package: Option<String>,
}

/// Collects packages and handlers before any load happens
pub struct ResourcesBuilder {
    host: Arc<dyn Host>,
    scheme: String,
    host_root: String,
    packages: IndexMap<String, Package>,
    overrides: AssetOverrides,
    json_patches: PatchList<Arc<dyn Patcher<Value>>>,
    image_patches: PatchList<Arc<dyn Patcher<PixelBuffer>>>,
    generated: GeneratedDocuments,
    engine: Arc<dyn PatchScriptEngine>,
}

impl ResourcesBuilder {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            scheme: DEFAULT_SCHEME.to_string(),
            host_root: ".".to_string(),
            packages: IndexMap::new(),
            overrides: AssetOverrides::new(),
            json_patches: PatchList::new(),
            image_patches: PatchList::new(),
            generated: GeneratedDocuments::new(),
            engine: Arc::new(MergePatchEngine),
        }
    }

    /// Scheme of package paths, without `://`
    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Directory of the host assets, relative to the host filesystem base (default: the base itself)
    pub fn host_root(mut self, root: &str) -> Self {
        self.host_root = paths::normalize(root);
        self
    }

    /// Engine applying the `.patch` scripts of packages added afterwards
    pub fn patch_engine(mut self, engine: Arc<dyn PatchScriptEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Register the overrides and patch scripts of an included package
    ///
    /// Packages must be added in load order; a package is only added once.
    pub fn add_package(&mut self, package: &Package) {
        if self.packages.contains_key(&package.id) {
            return;
        }

        self.overrides.add_package(package);
        for source in &package.patch_sources {
            let patcher = DocumentPatcher::new(
                &package.id,
                package.asset_path(&source.script),
                self.engine.clone(),
            );
            self.json_patches
                .add(source.target.as_str(), Arc::new(patcher) as Arc<dyn Patcher<Value>>);
        }
        tracing::debug!(
            "registered {} overrides and {} patches of '{}'",
            package.overrides.len(),
            package.patch_sources.len(),
            package.id
        );
        self.packages.insert(package.id.clone(), package.clone());
    }

    /// Add every included package of a resolved state, in load order
    pub fn add_load_set(&mut self, state: &LoaderState) {
        for package in state.load_set() {
            self.add_package(package);
        }
    }

    /// Document handler for one asset
    pub fn register_patch(&mut self, path: &str, patcher: Arc<dyn Patcher<Value>>) {
        self.json_patches.add(PathMatcher::from(path), patcher);
    }

    /// Document handler for every asset matching `pattern`
    pub fn register_pattern_patch(&mut self, pattern: Regex, patcher: Arc<dyn Patcher<Value>>) {
        self.json_patches.add(pattern, patcher);
    }

    pub fn register_image_patch(&mut self, path: &str, patcher: Arc<dyn Patcher<PixelBuffer>>) {
        self.image_patches.add(PathMatcher::from(path), patcher);
    }

    pub fn register_image_pattern_patch(
        &mut self,
        pattern: Regex,
        patcher: Arc<dyn Patcher<PixelBuffer>>,
    ) {
        self.image_patches.add(pattern, patcher);
    }

    /// Produce the base document of `path` instead of fetching it
    pub fn register_generated(&mut self, path: &str, generator: Arc<dyn DocumentGenerator>) {
        self.generated.add(path, generator);
    }

    /// Freeze the registry; override conflicts are reported here
    pub fn build(self) -> Resources {
        for conflict in self.overrides.conflicts() {
            tracing::warn!("{}", conflict.report());
        }

        Resources {
            host: self.host,
            scheme: self.scheme,
            host_root: self.host_root,
            packages: self.packages,
            overrides: self.overrides,
            json_patches: self.json_patches,
            image_patches: self.image_patches,
            generated: self.generated,
        }
    }
}

/// Immutable resource pipeline of one session
pub struct Resources {
    host: Arc<dyn Host>,
    scheme: String,
    host_root: String,
    packages: IndexMap<String, Package>,
    overrides: AssetOverrides,
    json_patches: PatchList<Arc<dyn Patcher<Value>>>,
    image_patches: PatchList<Arc<dyn Patcher<PixelBuffer>>>,
    generated: GeneratedDocuments,
}

impl Resources {
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Packages registered with the pipeline, in load order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    pub fn override_conflicts(&self) -> Vec<OverrideConflict> {
        self.overrides.conflicts()
    }

    /// Map a logical path to the concrete path the host should fetch
    pub fn resolve(&self, path: &str, options: &ResolveOptions) -> Result<ResolvedPath> {
        if let Some(parsed) = SchemePath::parse(&self.scheme, path) {
            let parsed = parsed.map_err(|reason| self.invalid_scheme_path(path, reason))?;
            let package = self.packages.get(parsed.package_id).ok_or_else(|| {
                self.invalid_scheme_path(
                    path,
                    SchemeError::UnknownPackage(parsed.package_id.to_string()),
                )
            })?;
            return Ok(ResolvedPath {
                concrete: package.resolve_path(parsed.path),
                logical: path.to_string(),
                is_host_asset: false,
                package: Some(package.id.clone()),
            });
        }

        let logical = asset_key(path);
        if options.allow_overrides {
            if let Some(candidate) = self.overrides.get(&logical) {
                return Ok(ResolvedPath {
                    concrete: candidate.concrete.clone(),
                    logical,
                    is_host_asset: true,
                    package: Some(candidate.package_id.clone()),
                });
            }
        }

        Ok(ResolvedPath {
            concrete: paths::jail_relative(&self.host_root, &logical),
            logical,
            is_host_asset: true,
            package: None,
        })
    }

    fn invalid_scheme_path(&self, path: &str, reason: SchemeError) -> ResourceError {
        ResourceError::InvalidSchemePath {
            scheme: self.scheme.clone(),
            path: path.to_string(),
            reason,
        }
    }

    /// Load a JSON document with every applicable handler applied
    pub async fn load_json(&self, path: &str, options: &LoadOptions) -> Result<Value> {
        let resolved = self.resolve(path, &options.resolve)?;
        let mut data = self.fetch_json(&resolved).await?;

        if !resolved.is_host_asset {
            return Ok(data);
        }
        let handlers = self.json_patches.for_path(&resolved.logical);
        if handlers.is_empty() {
            return Ok(data);
        }

        let ctx = PatchContext {
            resources: self,
            logical_path: &resolved.logical,
            resolved: &resolved,
            options,
        };
        apply_patches(&mut data, &handlers, &ctx)
            .await
            .map_err(|source| ResourceError::Patch {
                path: resolved.logical.clone(),
                source,
            })?;
        Ok(data)
    }

    /// Load a JSON document without running any handler
    pub async fn load_json_unpatched(&self, path: &str, options: &ResolveOptions) -> Result<Value> {
        let resolved = self.resolve(path, options)?;
        self.fetch_json(&resolved).await
    }

    async fn fetch_json(&self, resolved: &ResolvedPath) -> Result<Value> {
        if resolved.is_host_asset && resolved.package.is_none() {
            if let Some(generated) = self.generated.generate(&resolved.logical) {
                return generated.map_err(|source| ResourceError::Io {
                    path: resolved.logical.clone(),
                    source,
                });
            }
        }

        let text = self
            .host
            .read_text(&resolved.concrete)
            .await
            .map_err(|source| ResourceError::Io {
                path: resolved.logical.clone(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ResourceError::Json {
            path: resolved.logical.clone(),
            source,
        })
    }

    /// Load an image, converting between encoded and pixel form per `options`
    pub async fn load_image(&self, path: &str, options: &LoadOptions) -> Result<Image> {
        let resolved = self.resolve(path, &options.resolve)?;
        let image = self
            .host
            .fetch_image(&resolved.concrete)
            .await
            .map_err(|source| ResourceError::Io {
                path: resolved.logical.clone(),
                source,
            })?;
        let image_error = |source| ResourceError::Image {
            path: resolved.logical.clone(),
            source,
        };

        let handlers = if resolved.is_host_asset {
            self.image_patches.for_path(&resolved.logical)
        } else {
            Vec::new()
        };
        if handlers.is_empty() {
            return match options.buffer_mode {
                BufferMode::Always => Ok(Image::Pixels(image.into_pixels().map_err(image_error)?)),
                BufferMode::Never => Ok(Image::Encoded(image.into_encoded().map_err(image_error)?)),
                BufferMode::IfPatched => Ok(image),
            };
        }

        let mut pixels = image.into_pixels().map_err(image_error)?;
        let ctx = PatchContext {
            resources: self,
            logical_path: &resolved.logical,
            resolved: &resolved,
            options,
        };
        apply_patches(&mut pixels, &handlers, &ctx)
            .await
            .map_err(|source| ResourceError::Patch {
                path: resolved.logical.clone(),
                source,
            })?;

        match options.buffer_mode {
            BufferMode::Never => Ok(Image::Encoded(pixels.encode_png().map_err(image_error)?)),
            BufferMode::Always | BufferMode::IfPatched => Ok(Image::Pixels(pixels)),
        }
    }
}

/// Fetch every handler's auxiliary data concurrently, then patch in order
async fn apply_patches<D: Send>(
    data: &mut D,
    handlers: &[&Arc<dyn Patcher<D>>],
    ctx: &PatchContext<'_>,
) -> std::result::Result<(), BoxError> {
    let aux = try_join_all(handlers.iter().map(|handler| handler.dependencies(ctx))).await?;

    for (handler, aux) in handlers.iter().zip(aux) {
        if let Some(replacement) = handler.patch(data, aux, ctx).await? {
            *data = replacement;
        }
    }
    Ok(())
}
