//! Load order computation for installed packages

use crate::package::Package;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LoadOrderError {
    /// No package of the residual set could be ordered. The set contains every
    /// cycle but may also hold packages that merely depend on one.
    #[error(
        "Detected a dependency cycle, most likely in the following packages: {}",
        .packages.join(", ")
    )]
    CircularDependency { packages: Vec<String> },
}

pub type LoadOrderResult<T> = Result<T, LoadOrderError>;

/// Load order computer using repeated scans over an id-sorted worklist
pub struct LoadOrderComputer {
    /// Dependency graph: package -> installed dependencies, self edges removed
    graph: BTreeMap<String, Vec<String>>,
    /// Package placed first regardless of its dependencies
    first: Option<String>,
}

impl LoadOrderComputer {
    /// Build the graph from installed packages
    ///
    /// Edges to ids that are not installed are dropped: virtual packages and
    /// missing packages never delay ordering.
    pub fn new<'a>(runtime_id: &str, packages: impl IntoIterator<Item = &'a Package>) -> Self {
        let packages: Vec<&Package> = packages.into_iter().collect();
        let installed: HashSet<&str> = packages.iter().map(|p| p.id.as_str()).collect();

        let graph = packages
            .iter()
            .map(|package| {
                let deps = package
                    .dependencies
                    .keys()
                    .filter(|dep| **dep != package.id && installed.contains(dep.as_str()))
                    .cloned()
                    .collect();
                (package.id.clone(), deps)
            })
            .collect();

        Self::from_graph(graph, Some(runtime_id.to_string()))
    }

    /// Create from a raw dependency graph
    pub fn from_graph(graph: BTreeMap<String, Vec<String>>, first: Option<String>) -> Self {
        let first = first.filter(|id| graph.contains_key(id));
        Self { graph, first }
    }

    /// Compute the load order
    ///
    /// The first package is seated unconditionally. The others are scanned in id
    /// order; a package is placed as soon as all its dependencies are placed,
    /// which may happen within the same pass. A pass that places nothing ends
    /// the sort with a cycle error naming everything still unplaced.
    pub fn compute_load_order(&self) -> LoadOrderResult<Vec<String>> {
        let mut order: Vec<String> = Vec::with_capacity(self.graph.len());
        let mut placed: HashSet<&str> = HashSet::new();

        if let Some(first) = &self.first {
            order.push(first.clone());
            placed.insert(first.as_str());
        }

        let mut pending: Vec<&str> = self
            .graph
            .keys()
            .map(String::as_str)
            .filter(|id| !placed.contains(id))
            .collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut i = 0;
            while i < pending.len() {
                let id = pending[i];
                let ready = self.graph[id].iter().all(|d| placed.contains(d.as_str()));
                if ready {
                    order.push(id.to_string());
                    placed.insert(id);
                    pending.remove(i);
                } else {
                    i += 1;
                }
            }

            if pending.len() == before {
                return Err(LoadOrderError::CircularDependency {
                    packages: pending.iter().map(|id| id.to_string()).collect(),
                });
            }
        }

        Ok(order)
    }
}
