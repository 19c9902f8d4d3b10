//! Patch registry keyed by exact asset path or by pattern

use crate::asset_key;
use regex::Regex;
use std::collections::HashMap;

/// What a registered handler applies to
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// One asset; the path is canonicalized with [`asset_key`]
    Exact(String),
    /// Every asset whose canonical path matches
    Pattern(Regex),
}

impl From<&str> for PathMatcher {
    fn from(path: &str) -> Self {
        PathMatcher::Exact(path.to_string())
    }
}

impl From<String> for PathMatcher {
    fn from(path: String) -> Self {
        PathMatcher::Exact(path)
    }
}

impl From<Regex> for PathMatcher {
    fn from(pattern: Regex) -> Self {
        PathMatcher::Pattern(pattern)
    }
}

/// Append-only handler registry
///
/// [`PatchList::for_path`] yields every matching pattern handler followed by
/// every exact handler, each group in registration order.
#[derive(Debug)]
pub struct PatchList<H> {
    patterns: Vec<(Regex, H)>,
    specific: HashMap<String, Vec<H>>,
}

impl<H> Default for PatchList<H> {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            specific: HashMap::new(),
        }
    }
}

impl<H> PatchList<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, matcher: impl Into<PathMatcher>, handler: H) {
        match matcher.into() {
            PathMatcher::Exact(path) => {
                self.specific
                    .entry(asset_key(&path))
                    .or_default()
                    .push(handler);
            }
            PathMatcher::Pattern(pattern) => self.patterns.push((pattern, handler)),
        }
    }

    /// Handlers for a canonical asset path
    pub fn for_path(&self, path: &str) -> Vec<&H> {
        let mut handlers: Vec<&H> = self
            .patterns
            .iter()
            .filter(|(pattern, _)| pattern.is_match(path))
            .map(|(_, handler)| handler)
            .collect();

        if let Some(specific) = self.specific.get(path) {
            handlers.extend(specific.iter());
        }

        handlers
    }

    pub fn len(&self) -> usize {
        self.patterns.len() + self.specific.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
