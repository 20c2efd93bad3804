//! Post-install caveats.
//!
//! The compiler used for the build is not known at this point (caveats can
//! be asked for long after the install), so the installed libraries are
//! inspected instead.

use std::path::Path;

use anyhow::Result;

use crate::util::fs::glob_in_dir;

/// Pattern matching Boost.Log artifacts in the library directory.
pub const LOG_LIBRARY_PATTERN: &str = "libboost_log*";

pub const LOG_DISABLED_CAVEAT: &str =
    "Building of Boost.Log is disabled because it requires newer GCC or Clang.\n";

/// Caveats for an install whose libraries live in `lib_dir`.
///
/// Returns an empty string when there is nothing to report.
pub fn caveats(lib_dir: &Path) -> Result<String> {
    let mut s = String::new();

    if glob_in_dir(lib_dir, LOG_LIBRARY_PATTERN)?.is_empty() {
        s.push_str(LOG_DISABLED_CAVEAT);
    }

    Ok(s)
}
