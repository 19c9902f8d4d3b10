//! Structured patch scripts shipped by packages (`<asset>.patch`)

use crate::patcher::{take_aux, Aux, PatchContext, Patcher};
use crate::pipeline::{ResolveOptions, Resources};
use crate::{BoxError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Where a patch script wants to load an extra document from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOrigin {
    /// Host asset path
    Host,
    /// Path inside a package; an empty id means the script's own package
    Package(String),
}

/// Loader handed to a [`PatchScriptEngine`] while a script runs
pub struct ScriptLoader<'a> {
    resources: &'a Resources,
    package_id: &'a str,
}

impl<'a> ScriptLoader<'a> {
    pub fn new(resources: &'a Resources, package_id: &'a str) -> Self {
        Self {
            resources,
            package_id,
        }
    }

    /// Package the running script belongs to
    pub fn package_id(&self) -> &str {
        self.package_id
    }

    /// Load an unpatched document
    pub async fn load(&self, origin: &PatchOrigin, path: &str) -> Result<Value> {
        match origin {
            PatchOrigin::Host => {
                self.resources
                    .load_json_unpatched(path, &ResolveOptions::default())
                    .await
            }
            PatchOrigin::Package(id) => {
                let id = if id.is_empty() { self.package_id } else { id.as_str() };
                let scheme_path = format!(
                    "{}://{}/{}",
                    self.resources.scheme(),
                    id,
                    path.trim_start_matches('/')
                );
                self.resources
                    .load_json_unpatched(&scheme_path, &ResolveOptions::default())
                    .await
            }
        }
    }
}

/// Interpreter for patch scripts
#[async_trait]
pub trait PatchScriptEngine: Send + Sync {
    async fn apply(
        &self,
        data: &mut Value,
        script: Value,
        loader: &ScriptLoader<'_>,
    ) -> std::result::Result<(), BoxError>;
}

/// Engine for object scripts: the script is merged into the document
///
/// Nested objects are merged key by key, anything else is replaced. Step-list
/// (array) scripts are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePatchEngine;

#[async_trait]
impl PatchScriptEngine for MergePatchEngine {
    async fn apply(
        &self,
        data: &mut Value,
        script: Value,
        _loader: &ScriptLoader<'_>,
    ) -> std::result::Result<(), BoxError> {
        match script {
            Value::Object(_) => {
                merge_into(data, script);
                Ok(())
            }
            Value::Array(_) => {
                Err("step-list patch scripts are not supported by the merge engine".into())
            }
            other => Err(format!("patch script must be an object, got {}", other).into()),
        }
    }
}

/// Merge `source` over `target`
///
/// Objects merge recursively; arrays and scalars from `source` replace.
pub fn merge_into(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                if let Some(existing) = target.get_mut(&key) {
                    if existing.is_object() && value.is_object() {
                        merge_into(existing, value);
                        continue;
                    }
                }
                target.insert(key, value);
            }
        }
        (target, source) => *target = source,
    }
}

/// Handler applying one package patch script to its target document
pub struct DocumentPatcher {
    package_id: String,
    /// Concrete path of the script
    script_path: String,
    engine: Arc<dyn PatchScriptEngine>,
}

impl DocumentPatcher {
    pub fn new(package_id: &str, script_path: String, engine: Arc<dyn PatchScriptEngine>) -> Self {
        Self {
            package_id: package_id.to_string(),
            script_path,
            engine,
        }
    }
}

#[async_trait]
impl Patcher<Value> for DocumentPatcher {
    async fn dependencies(
        &self,
        ctx: &PatchContext<'_>,
    ) -> std::result::Result<Option<Aux>, BoxError> {
        let text = ctx
            .resources
            .host()
            .read_text(&self.script_path)
            .await
            .map_err(|e| format!("failed to read patch script '{}': {}", self.script_path, e))?;
        let script: Value = serde_json::from_str(&text)
            .map_err(|e| format!("invalid patch script '{}': {}", self.script_path, e))?;
        Ok(Some(Box::new(script)))
    }

    async fn patch(
        &self,
        data: &mut Value,
        aux: Option<Aux>,
        ctx: &PatchContext<'_>,
    ) -> std::result::Result<Option<Value>, BoxError> {
        let script: Value = take_aux(aux)?;
        let loader = ScriptLoader::new(ctx.resources, &self.package_id);
        self.engine
            .apply(data, script, &loader)
            .await
            .map_err(|e| format!("patch script '{}' failed: {}", self.script_path, e))?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_into() {
        let mut target = json!({
            "name": "sword",
            "stats": { "atk": 1, "def": 2 },
            "tags": ["a", "b"]
        });
        merge_into(
            &mut target,
            json!({ "stats": { "atk": 5 }, "tags": ["c"], "new": null }),
        );

        assert_eq!(
            target,
            json!({
                "name": "sword",
                "stats": { "atk": 5, "def": 2 },
                "tags": ["c"],
                "new": null
            })
        );
    }

    #[test]
    fn test_merge_replaces_non_objects() {
        let mut target = json!([1, 2]);
        merge_into(&mut target, json!({ "a": 1 }));
        assert_eq!(target, json!({ "a": 1 }));
    }
}
