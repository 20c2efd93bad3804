//! Configuration file support for Boostkeg.
//!
//! Two configuration file locations are merged:
//! - Global: `~/.boostkeg/config.toml` - User-wide defaults
//! - Project: `.boostkeg/config.toml` - Per-directory overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [install]
//! prefix = "/usr/local/opt/boost@1.65.1"
//! jobs = 8
//! options = ["--without-static"]
//!
//! [toolchain]
//! cxx = "/usr/bin/clang++"
//! compiler = "clang"
//!
//! [dependencies]
//! opt_root = "/usr/local/opt"
//! icu4c = "/usr/local/opt/icu4c"
//!
//! [net]
//! offline = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::CompilerKind;
use crate::core::dependency::OptRootLocator;

/// Boostkeg configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub install: InstallConfig,
    pub toolchain: ToolchainConfig,
    pub dependencies: DependencyConfig,
    pub net: NetConfig,
    /// `install.options` of each merged file, lowest precedence first
    #[serde(skip)]
    option_layers: Vec<Vec<String>>,
}

/// Install defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Install prefix
    pub prefix: Option<PathBuf>,
    /// Parallelism for the external build
    pub jobs: Option<usize>,
    /// `--with-*`/`--without-*` toggles; a later file or the command line
    /// overrides these per option
    pub options: Vec<String>,
}

/// Compiler overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Path to the C++ compiler (e.g., /usr/bin/clang++)
    pub cxx: Option<PathBuf>,
    /// Force the compiler family instead of detecting it
    pub compiler: Option<CompilerKind>,
}

/// Where installed dependencies live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Directory holding one prefix per package (`<opt_root>/<name>`)
    pub opt_root: Option<PathBuf>,
    /// Explicit prefixes by package name
    #[serde(flatten)]
    pub prefixes: BTreeMap<String, PathBuf>,
}

/// Network settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Never download; only use cached or local archives
    pub offline: bool,
    /// Override the download cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.install.prefix.is_some() {
            self.install.prefix = other.install.prefix;
        }
        if other.install.jobs.is_some() {
            self.install.jobs = other.install.jobs;
        }
        // Each file's toggles stay a separate layer so a later file can
        // flip an option an earlier one set
        if !other.install.options.is_empty() {
            self.option_layers.push(other.install.options.clone());
            self.install.options = other.install.options;
        }

        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if other.toolchain.compiler.is_some() {
            self.toolchain.compiler = other.toolchain.compiler;
        }

        if other.dependencies.opt_root.is_some() {
            self.dependencies.opt_root = other.dependencies.opt_root;
        }
        self.dependencies.prefixes.extend(other.dependencies.prefixes);

        if other.net.offline {
            self.net.offline = true;
        }
        if other.net.cache_dir.is_some() {
            self.net.cache_dir = other.net.cache_dir;
        }
    }

    /// Toggle layers from the merged files, lowest precedence first.
    pub fn option_layers(&self) -> Vec<Vec<String>> {
        if self.option_layers.is_empty() && !self.install.options.is_empty() {
            return vec![self.install.options.clone()];
        }
        self.option_layers.clone()
    }

    /// Build the dependency locator for an install into `prefix`.
    ///
    /// Without a configured `opt_root`, sibling packages are looked up next
    /// to `prefix`.
    pub fn dependency_locator(&self, prefix: &Path) -> OptRootLocator {
        let opt_root = self
            .dependencies
            .opt_root
            .clone()
            .or_else(|| default_opt_root(prefix));

        self.dependencies
            .prefixes
            .iter()
            .fold(OptRootLocator::new(opt_root), |locator, (name, prefix)| {
                locator.with_override(name.clone(), prefix.clone())
            })
    }

    /// Download cache directory.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.net.cache_dir.clone().or_else(default_cache_dir)
    }
}

/// Sibling packages are expected next to our own prefix.
fn default_opt_root(prefix: &Path) -> Option<PathBuf> {
    prefix.parent().map(Path::to_path_buf)
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.boostkeg/config.toml)
/// 2. Global config (~/.boostkeg/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load(global)?);
    }

    if project_path.exists() {
        config.merge(Config::load(project_path)?);
    }

    Ok(config)
}

/// Load configuration for the current directory.
pub fn load_default_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let global = global_config_path();
    load_config(global.as_deref(), &project_config_path(&cwd))
}

/// Get the global config directory (~/.boostkeg).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".boostkeg"))
}

/// Get the global config path (~/.boostkeg/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.boostkeg/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".boostkeg").join("config.toml")
}

/// Platform cache directory for downloaded archives.
pub fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "boostkeg").map(|d| d.cache_dir().join("downloads"))
}
