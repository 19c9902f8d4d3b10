//! Documents produced in memory instead of fetched from the host

use crate::{asset_key, BoxError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Produces the base content of a generated document
pub trait DocumentGenerator: Send + Sync {
    fn generate(&self) -> Result<Value, BoxError>;
}

impl<F> DocumentGenerator for F
where
    F: Fn() -> Result<Value, BoxError> + Send + Sync,
{
    fn generate(&self) -> Result<Value, BoxError> {
        self()
    }
}

/// Generators keyed by canonical asset path; a later registration replaces an earlier one
#[derive(Default)]
pub struct GeneratedDocuments {
    generators: HashMap<String, Arc<dyn DocumentGenerator>>,
}

impl GeneratedDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, generator: Arc<dyn DocumentGenerator>) {
        let key = asset_key(path);
        if self.generators.insert(key.clone(), generator).is_some() {
            tracing::debug!("generator for '{}' replaced", key);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.generators.contains_key(path)
    }

    /// Run the generator for a canonical path, if one is registered
    pub fn generate(&self, path: &str) -> Option<Result<Value, BoxError>> {
        self.generators.get(path).map(|generator| generator.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate() {
        let mut generated = GeneratedDocuments::new();
        generated.add(
            "/data/generated.json",
            Arc::new(|| -> Result<Value, BoxError> { Ok(json!({ "n": 1 })) }),
        );

        assert!(generated.contains("data/generated.json"));
        assert_eq!(
            generated.generate("data/generated.json").unwrap().unwrap(),
            json!({ "n": 1 })
        );
        assert!(generated.generate("data/other.json").is_none());
    }
}
