//! High-level operations behind the CLI commands.

pub mod caveats;
pub mod fetch;
pub mod info;
pub mod install;
pub mod smoke_test;

pub use caveats::{caveats, LOG_DISABLED_CAVEAT};
pub use fetch::{prepare_source, SourceSpec};
pub use info::format_info;
pub use install::{install, plan_install, InstallOptions, InstallReport};
pub use smoke_test::{run_smoke_test, SmokeTestReport, SMOKE_TEST_SOURCE};
