//! Command implementations

pub mod caveats;
pub mod completions;
pub mod fetch;
pub mod info;
pub mod install;
pub mod plan;

use std::path::PathBuf;

use boostkeg::builder::ToolchainOverrides;
use boostkeg::util::config::Config;
use boostkeg::Formula;

use crate::cli::ToolchainArgs;

/// Install prefix: CLI, then config, then the keg location.
pub fn resolve_prefix(cli: Option<PathBuf>, config: &Config, formula: &Formula) -> PathBuf {
    cli.or_else(|| config.install.prefix.clone())
        .unwrap_or_else(|| PathBuf::from("/usr/local/opt").join(formula.name))
}

/// Toggle layers: global config, project config, then the command line.
pub fn toggle_layers(config: &Config, cli: Vec<String>) -> Vec<Vec<String>> {
    let mut layers = config.option_layers();
    layers.push(cli);
    layers
}

/// Compiler overrides: CLI, then config.
pub fn toolchain_overrides(args: &ToolchainArgs, config: &Config) -> ToolchainOverrides {
    let cli = args.overrides();
    ToolchainOverrides {
        cxx: cli.cxx.or_else(|| config.toolchain.cxx.clone()),
        compiler: cli.compiler.or(config.toolchain.compiler),
        jobs: cli.jobs.or(config.install.jobs),
    }
}
