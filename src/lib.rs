//! Boostkeg - build and install recipe runner for Boost 1.65.1
//!
//! This crate resolves build options and host toolchain facts into the
//! upstream `bootstrap.sh` and `b2` command lines, runs them in sequence,
//! and validates the installed result.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for Boostkeg unit tests.
///
/// Provides a recording command runner and fake install trees so the
/// pipeline can be exercised without a real Boost checkout.
#[cfg(test)]
pub mod test_support;

pub use core::{errors::InstallError, formula::Formula, options::FeatureFlags};

pub use builder::{CompilerKind, InstallLayout, InstallPlan, OptionResolver, ToolchainFacts};
