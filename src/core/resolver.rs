use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::environment::InstalledPackages;
use super::metadata::TopLevelIndex;

/// Pinned requirements, sorted by package name.
pub type Requirements = BTreeMap<String, String>;

/// Maps imported top-level modules onto installed distributions.
#[derive(Debug, Clone)]
pub struct PackageResolver {
    /// Canonical name -> (spelling reported by the package manager, version)
    installed: HashMap<String, (String, String)>,

    /// Canonical module name -> distributions declaring it
    module_index: HashMap<String, Vec<String>>,
}

impl PackageResolver {
    pub fn new(installed: &InstalledPackages, top_levels: &TopLevelIndex) -> Self {
        let installed = installed
            .iter()
            .map(|(name, version)| (canonical_name(name), (name.clone(), version.clone())))
            .collect();

        let mut module_index: HashMap<String, Vec<String>> = HashMap::new();
        for (distribution, modules) in top_levels {
            for module in modules {
                module_index
                    .entry(canonical_name(module))
                    .or_default()
                    .push(distribution.clone());
            }
        }

        Self {
            installed,
            module_index,
        }
    }

    /// Modules whose name is itself an installed distribution.
    pub fn direct_matches(&self, modules: &BTreeSet<String>) -> Requirements {
        modules
            .iter()
            .filter_map(|module| self.lookup(module))
            .collect()
    }

    /// Distributions that declare one of the modules as a top-level name.
    pub fn top_level_matches(&self, modules: &BTreeSet<String>) -> Requirements {
        modules
            .iter()
            .filter_map(|module| self.module_index.get(&canonical_name(module)))
            .flatten()
            .filter_map(|distribution| self.lookup(distribution))
            .collect()
    }

    /// Top-level matches, overridden by direct matches.
    pub fn resolve(&self, modules: &BTreeSet<String>) -> Requirements {
        let mut requirements = self.top_level_matches(modules);
        requirements.extend(self.direct_matches(modules));
        requirements
    }

    fn lookup(&self, name: &str) -> Option<(String, String)> {
        self.installed.get(&canonical_name(name)).cloned()
    }
}

/// Lowercase, with runs of `-`, `_` and `.` collapsed to a single `-`.
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                canonical.push('-');
            }
            in_separator = true;
        } else {
            canonical.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    canonical
}
