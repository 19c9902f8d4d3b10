//! Callbacks run when a host module finishes initializing

use std::collections::{HashMap, HashSet};

type Hook = Box<dyn Fn(&str) + Send + Sync>;

/// Observer lists keyed by module name
///
/// The host reports each module initialization once; the hooks registered for
/// that module run synchronously, in registration order.
#[derive(Default)]
pub struct ModuleHooks {
    hooks: HashMap<String, Vec<Hook>>,
    initialized: HashSet<String>,
}

impl ModuleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: &str, hook: impl Fn(&str) + Send + Sync + 'static) {
        if self.initialized.contains(module) {
            tracing::warn!("hook added after module '{}' was initialized", module);
        }
        self.hooks
            .entry(module.to_string())
            .or_default()
            .push(Box::new(hook));
    }

    /// Dispatch the hooks of `module`; returns how many ran
    ///
    /// A repeated notification for the same module runs nothing.
    pub fn module_initialized(&mut self, module: &str) -> usize {
        if !self.initialized.insert(module.to_string()) {
            return 0;
        }
        let Some(hooks) = self.hooks.get(module) else {
            return 0;
        };
        for hook in hooks {
            hook(module);
        }
        hooks.len()
    }

    pub fn is_initialized(&self, module: &str) -> bool {
        self.initialized.contains(module)
    }
}
