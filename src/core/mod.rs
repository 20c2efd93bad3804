//! Core data structures for Boostkeg.
//!
//! This module contains the foundational types used throughout the crate:
//! - Formula metadata (archive, checksum, declared options, patches)
//! - Feature flag resolution from `--with-*`/`--without-*` toggles
//! - Optional dependency lookup
//! - Typed install errors

pub mod dependency;
pub mod errors;
pub mod formula;
pub mod options;

pub use dependency::{DependencyLocator, OptRootLocator};
pub use errors::InstallError;
pub use formula::Formula;
pub use options::{BuildOption, DeprecatedOption, FeatureFlags};
