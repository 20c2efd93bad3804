//! Recipe metadata for the Boost 1.65.1 formula.

use semver::Version;
use serde::Serialize;

use crate::core::options::{BuildOption, DeprecatedOption};

/// Why the install is not linked into a shared prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KegOnly {
    /// Another version of the same library owns the unversioned name.
    VersionedFormula,
}

impl KegOnly {
    pub fn explanation(&self) -> &'static str {
        match self {
            KegOnly::VersionedFormula => "this is an alternate version of another formula",
        }
    }
}

/// A patch shipped alongside the recipe.
#[derive(Debug, Clone, Serialize)]
pub struct VendoredPatch {
    /// File name under `patches/`
    pub name: &'static str,
    /// Upstream reference for the fix
    pub upstream: &'static str,
    /// Patch body in unified diff format
    #[serde(skip)]
    pub contents: &'static str,
}

/// An optional dependency, enabled by the option of the same name.
#[derive(Debug, Clone, Serialize)]
pub struct OptionalDependency {
    pub name: &'static str,
}

/// The build recipe: where the source lives and what can be toggled.
#[derive(Debug, Clone, Serialize)]
pub struct Formula {
    pub name: &'static str,
    pub description: &'static str,
    pub homepage: &'static str,
    pub version: Version,
    pub revision: u32,
    pub url: &'static str,
    pub sha256: &'static str,
    pub head: &'static str,
    pub keg_only: KegOnly,
    pub options: Vec<BuildOption>,
    pub deprecated_options: Vec<DeprecatedOption>,
    pub optional_dependencies: Vec<OptionalDependency>,
    pub patches: Vec<VendoredPatch>,
}

/// Toolset name used in the generated `user-config.jam` line.
pub const USER_CONFIG_TOOLSET: &str = "darwin";

/// Name of the generated Boost.Build user config, relative to the source tree.
pub const USER_CONFIG_FILE: &str = "user-config.jam";

/// Libraries that are never built.
pub const ALWAYS_EXCLUDED_LIBRARIES: [&str; 2] = ["python", "mpi"];

impl Formula {
    /// The Boost 1.65.1 recipe.
    pub fn boost() -> Self {
        Formula {
            name: "boost@1.65.1",
            description: "Collection of portable C++ source libraries",
            homepage: "https://www.boost.org/",
            version: Version::new(1, 65, 1),
            revision: 2,
            url: "https://dl.bintray.com/boostorg/release/1.65.1/source/boost_1_65_1.tar.bz2",
            sha256: "9807a5d16566c57fd74fb522764e0b134a8bbe6b6e8967b83afefd30dcd3be81",
            head: "https://github.com/boostorg/boost.git",
            keg_only: KegOnly::VersionedFormula,
            options: vec![
                BuildOption {
                    name: "icu4c",
                    description: "Build regexp engine with icu support",
                    default_enabled: false,
                },
                BuildOption {
                    name: "single",
                    description: "Disable building single-threading variant",
                    default_enabled: true,
                },
                BuildOption {
                    name: "static",
                    description: "Disable building static library variant",
                    default_enabled: true,
                },
            ],
            deprecated_options: vec![DeprecatedOption {
                old: "with-icu",
                new: "with-icu4c",
            }],
            optional_dependencies: vec![OptionalDependency { name: "icu4c" }],
            patches: vec![VendoredPatch {
                name: "darwin-version-check.patch",
                upstream: "https://github.com/boostorg/build/pull/560",
                contents: include_str!("../../patches/darwin-version-check.patch"),
            }],
        }
    }

    /// Top-level directory inside the release archive (`boost_1_65_1`).
    pub fn archive_root(&self) -> String {
        format!(
            "boost_{}_{}_{}",
            self.version.major, self.version.minor, self.version.patch
        )
    }

    /// Archive file name taken from the URL.
    pub fn archive_file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(self.url)
    }

    /// Version string including the recipe revision (`1.65.1_2`).
    pub fn full_version(&self) -> String {
        if self.revision == 0 {
            self.version.to_string()
        } else {
            format!("{}_{}", self.version, self.revision)
        }
    }
}
