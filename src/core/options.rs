//! Build option declarations and feature flag resolution.
//!
//! The recipe exposes boolean toggles as `--with-<name>` / `--without-<name>`
//! pairs. Resolution starts from each option's default and applies the
//! toggles supplied by the global config, the project config and the
//! command line, in that order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::InstallError;

/// A declared boolean build option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOption {
    /// Option name without the `with-`/`without-` prefix (e.g. "single")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether the option is enabled when no toggle is given
    pub default_enabled: bool,
}

impl BuildOption {
    /// The flag that flips this option away from its default.
    pub fn non_default_flag(&self) -> String {
        if self.default_enabled {
            format!("--without-{}", self.name)
        } else {
            format!("--with-{}", self.name)
        }
    }
}

/// A deprecated flag that maps onto a current option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeprecatedOption {
    /// Old flag body (e.g. "with-icu")
    pub old: &'static str,
    /// Replacement flag body (e.g. "with-icu4c")
    pub new: &'static str,
}

/// Resolved feature flags for one install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Build the regex engine against ICU (`icu4c`)
    pub icu_support: bool,
    /// Also build the single-threading variant
    pub single_threading: bool,
    /// Also build the static library variant
    pub static_linking: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            icu_support: false,
            single_threading: true,
            static_linking: true,
        }
    }
}

impl FeatureFlags {
    /// Resolve flags from one list of `--with-*`/`--without-*` toggles.
    ///
    /// Deprecated aliases are rewritten to their replacement first. Giving
    /// both polarities of one option is an error regardless of order;
    /// repeating the same toggle is harmless.
    pub fn resolve<S: AsRef<str>>(
        options: &[BuildOption],
        deprecated: &[DeprecatedOption],
        toggles: &[S],
    ) -> Result<FeatureFlags, InstallError> {
        Self::resolve_layered(options, deprecated, &[toggles])
    }

    /// Resolve flags from layered toggle lists, lowest precedence first.
    ///
    /// Conflicts are only checked within a layer. A later layer overrides
    /// an earlier one per option name, so a project config can undo a
    /// global one and the command line can undo both.
    pub fn resolve_layered<S: AsRef<str>, L: AsRef<[S]>>(
        options: &[BuildOption],
        deprecated: &[DeprecatedOption],
        layers: &[L],
    ) -> Result<FeatureFlags, InstallError> {
        let mut requested: BTreeMap<&'static str, bool> = BTreeMap::new();

        for layer in layers {
            for (name, enabled) in requested_in_layer(options, deprecated, layer.as_ref())? {
                if requested.insert(name, enabled).is_some_and(|previous| previous != enabled) {
                    tracing::debug!("option `{}` overridden to {}", name, enabled);
                }
            }
        }

        let value = |name: &str| -> bool {
            requested.get(name).copied().unwrap_or_else(|| {
                options
                    .iter()
                    .find(|o| o.name == name)
                    .map(|o| o.default_enabled)
                    .unwrap_or(false)
            })
        };

        Ok(FeatureFlags {
            icu_support: value("icu4c"),
            single_threading: value("single"),
            static_linking: value("static"),
        })
    }
}

/// Parse one layer of toggles into option name -> enabled.
fn requested_in_layer<S: AsRef<str>>(
    options: &[BuildOption],
    deprecated: &[DeprecatedOption],
    toggles: &[S],
) -> Result<BTreeMap<&'static str, bool>, InstallError> {
    let mut requested: BTreeMap<&'static str, bool> = BTreeMap::new();

    for toggle in toggles {
        let raw = toggle.as_ref();
        let body = raw.trim_start_matches('-');

        let body = match deprecated.iter().find(|d| d.old == body) {
            Some(alias) => {
                tracing::warn!(
                    "option `--{}` is deprecated; use `--{}` instead",
                    alias.old,
                    alias.new
                );
                alias.new
            }
            None => body,
        };

        let (enabled, name) = if let Some(name) = body.strip_prefix("without-") {
            (false, name)
        } else if let Some(name) = body.strip_prefix("with-") {
            (true, name)
        } else {
            return Err(InstallError::UnknownOption {
                option: raw.to_string(),
            });
        };

        let Some(option) = options.iter().find(|o| o.name == name) else {
            return Err(InstallError::UnknownOption {
                option: raw.to_string(),
            });
        };

        if requested.get(option.name).is_some_and(|&previous| previous != enabled) {
            return Err(InstallError::ConflictingOption {
                name: option.name.to_string(),
            });
        }
        requested.insert(option.name, enabled);
    }

    Ok(requested)
}
