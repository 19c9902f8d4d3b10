//! Fallback for lang files
//!
//! Only the lang files of the active locale get loaded, so strings that a
//! package adds to the default locale would be missing everywhere else. This
//! handler loads `data/lang/<feature>.<default locale>.json` alongside every
//! other locale's file and merges the locale file over it.

use crate::document::merge_into;
use crate::patcher::{take_aux, Aux, PatchContext, Patcher};
use crate::pipeline::ResourcesBuilder;
use crate::BoxError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

const LANG_FILE_PATTERN: &str = r"^data/lang/(?P<feature>.+)\.(?P<locale>[^./]+)\.json$";

pub struct LangFallbackPatcher {
    default_locale: String,
    pattern: Regex,
}

impl LangFallbackPatcher {
    pub fn new(default_locale: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            default_locale: default_locale.to_string(),
            pattern: Regex::new(LANG_FILE_PATTERN)?,
        })
    }

    /// Register as a pattern handler for every lang file
    pub fn register(builder: &mut ResourcesBuilder, default_locale: &str) -> Result<(), regex::Error> {
        let patcher = Self::new(default_locale)?;
        let pattern = patcher.pattern.clone();
        builder.register_pattern_patch(pattern, Arc::new(patcher));
        Ok(())
    }

    /// Default-locale counterpart of a lang file, or `None` for the default locale itself
    pub fn fallback_path(&self, path: &str) -> Option<String> {
        let captures = self.pattern.captures(path)?;
        if &captures["locale"] == self.default_locale {
            return None;
        }
        Some(format!(
            "data/lang/{}.{}.json",
            &captures["feature"], self.default_locale
        ))
    }
}

#[async_trait]
impl Patcher<Value> for LangFallbackPatcher {
    async fn dependencies(&self, ctx: &PatchContext<'_>) -> Result<Option<Aux>, BoxError> {
        let Some(fallback) = self.fallback_path(ctx.logical_path) else {
            return Ok(None);
        };
        // Patched, so strings that packages add to the default locale fall through too
        let base = ctx.resources.load_json(&fallback, ctx.options).await?;
        Ok(Some(Box::new(base)))
    }

    async fn patch(
        &self,
        data: &mut Value,
        aux: Option<Aux>,
        _ctx: &PatchContext<'_>,
    ) -> Result<Option<Value>, BoxError> {
        if aux.is_none() {
            return Ok(None);
        }
        let mut merged: Value = take_aux(aux)?;
        merge_into(&mut merged, std::mem::take(data));
        Ok(Some(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_path() {
        let patcher = LangFallbackPatcher::new("en_US").unwrap();
        assert_eq!(
            patcher.fallback_path("data/lang/sc/gui.de_DE.json").as_deref(),
            Some("data/lang/sc/gui.en_US.json")
        );
        assert_eq!(patcher.fallback_path("data/lang/sc/gui.en_US.json"), None);
        assert_eq!(patcher.fallback_path("data/maps/gui.de_DE.json"), None);
    }
}
