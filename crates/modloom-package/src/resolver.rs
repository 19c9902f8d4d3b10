//! Dependency constraint verification
//!
//! Runs after ordering. A package whose dependencies cannot be satisfied is
//! dropped from the load set; the check is repeated until nothing changes so
//! that dropping a package also drops everything that requires it.

use crate::package::{DependencyConstraint, Package};
use crate::state::{DependencyTarget, LoaderState};
use std::collections::HashSet;
use std::fmt;

/// A package left out of the load set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub id: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Turned off in the mod settings
    Disabled,
    /// One message per failing dependency
    UnsatisfiedDependencies(Vec<String>),
}

impl Exclusion {
    /// Generate a human-readable report
    pub fn report(&self) -> String {
        match &self.reason {
            ExclusionReason::Disabled => format!("'{}' is disabled", self.id),
            ExclusionReason::UnsatisfiedDependencies(problems) => {
                let mut report = format!("Could not load '{}':\n", self.id);
                for problem in problems {
                    report.push_str(&format!("  - {}\n", problem));
                }
                report
            }
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ExclusionReason::Disabled => write!(f, "'{}' is disabled", self.id),
            ExclusionReason::UnsatisfiedDependencies(problems) => {
                write!(f, "could not load '{}': {}", self.id, problems.join("; "))
            }
        }
    }
}

/// Compute the load set of an ordered state
///
/// Returns the ids of included packages and the exclusions, both following
/// the current package order.
pub(crate) fn compute_load_set(state: &LoaderState) -> (HashSet<String>, Vec<Exclusion>) {
    let mut exclusions = Vec::new();
    let mut loaded: HashSet<String> = HashSet::new();

    for package in state.installed() {
        if state.is_enabled(&package.id) {
            loaded.insert(package.id.clone());
        } else {
            exclusions.push(Exclusion {
                id: package.id.clone(),
                reason: ExclusionReason::Disabled,
            });
        }
    }

    loop {
        let mut changed = false;

        for package in state.installed() {
            if !loaded.contains(&package.id) {
                continue;
            }
            let problems = verify_dependencies(package, state, &loaded);
            if problems.is_empty() {
                continue;
            }

            tracing::warn!(
                "Could not load package '{}': {}",
                package.id,
                problems.join("; ")
            );
            loaded.remove(&package.id);
            exclusions.push(Exclusion {
                id: package.id.clone(),
                reason: ExclusionReason::UnsatisfiedDependencies(problems),
            });
            changed = true;
        }

        if !changed {
            break;
        }
    }

    (loaded, exclusions)
}

/// Problems with the dependencies of `package`, given the ids currently loaded
pub fn verify_dependencies(
    package: &Package,
    state: &LoaderState,
    loaded: &HashSet<String>,
) -> Vec<String> {
    package
        .dependencies
        .iter()
        .filter_map(|(dep_id, constraint)| {
            check_dependency_constraint(package, dep_id, constraint, state, loaded)
        })
        .collect()
}

fn check_dependency_constraint(
    package: &Package,
    dep_id: &str,
    constraint: &DependencyConstraint,
    state: &LoaderState,
    loaded: &HashSet<String>,
) -> Option<String> {
    if dep_id == package.id {
        return Some("a package can't depend on itself".to_string());
    }

    let unavailable = |problem: String| (!constraint.optional).then_some(problem);

    let (title, version) = match state.lookup(dep_id) {
        DependencyTarget::Virtual(virtual_package) => {
            (virtual_package.id.clone(), &virtual_package.version)
        }
        DependencyTarget::Installed(dependency) => {
            if !state.is_enabled(dep_id) {
                return unavailable(format!("package '{}' is disabled", dep_id));
            }
            if !loaded.contains(dep_id) {
                return unavailable(format!("package '{}' is not loaded", dep_id));
            }
            (format!("package '{}'", dep_id), &dependency.version)
        }
        DependencyTarget::Missing => {
            return unavailable(format!("package '{}' is not installed", dep_id));
        }
    };

    if constraint.range.matches(version) {
        None
    } else {
        Some(format!(
            "version of {} ({}) is not in range '{}'",
            title, version, constraint.range
        ))
    }
}
