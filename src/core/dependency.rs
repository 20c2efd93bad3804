//! Optional dependency lookup.
//!
//! Dependencies are not built here. A sibling package is expected to be
//! installed already, and the locator only answers where its prefix is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::errors::InstallError;

/// Answers the install prefix of an already-installed package.
pub trait DependencyLocator {
    /// Get the install prefix for a package by name.
    fn opt_prefix(&self, name: &str) -> Result<PathBuf, InstallError>;
}

/// Locates dependencies through explicit overrides, then `<opt_root>/<name>`.
#[derive(Debug, Clone, Default)]
pub struct OptRootLocator {
    overrides: BTreeMap<String, PathBuf>,
    opt_root: Option<PathBuf>,
}

impl OptRootLocator {
    /// Create a locator searching the given opt root.
    pub fn new(opt_root: Option<PathBuf>) -> Self {
        OptRootLocator {
            overrides: BTreeMap::new(),
            opt_root,
        }
    }

    /// Pin a dependency to an explicit prefix.
    pub fn with_override(mut self, name: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        self.overrides.insert(name.into(), prefix.into());
        self
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = self.overrides.get(name) {
            candidates.push(path.clone());
        }
        if let Some(root) = &self.opt_root {
            candidates.push(root.join(name));
        }
        candidates
    }
}

impl DependencyLocator for OptRootLocator {
    fn opt_prefix(&self, name: &str) -> Result<PathBuf, InstallError> {
        let candidates = self.candidates(name);

        match candidates.iter().find(|p| is_installed_prefix(p)) {
            Some(prefix) => {
                tracing::debug!("resolved `{}` to {}", name, prefix.display());
                Ok(prefix.clone())
            }
            None => Err(InstallError::MissingDependency {
                name: name.to_string(),
                searched: candidates,
            }),
        }
    }
}

/// A prefix counts as installed when it has a `lib` or `include` directory.
fn is_installed_prefix(path: &Path) -> bool {
    path.join("lib").is_dir() || path.join("include").is_dir()
}
