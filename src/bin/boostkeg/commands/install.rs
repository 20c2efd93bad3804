//! `boostkeg install` command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::commands::{resolve_prefix, toggle_layers, toolchain_overrides};
use boostkeg::builder::SystemRunner;
use boostkeg::ops::{install, InstallOptions, SourceSpec};
use boostkeg::sources::FetchOptions;
use boostkeg::util::config::load_default_config;
use boostkeg::util::shell::{Shell, Status};
use boostkeg::Formula;

pub fn execute(args: InstallArgs, shell: &Shell) -> Result<()> {
    let formula = Formula::boost();
    let config = load_default_config()?;

    let source = match args.source {
        Some(dir) => SourceSpec::Tree(dir),
        None => SourceSpec::Archive {
            fetch: FetchOptions {
                archive: args.archive,
                cache_dir: config.cache_dir(),
                offline: args.offline || config.net.offline,
            },
            dest: args
                .build_dir
                .unwrap_or_else(|| std::env::temp_dir().join("boostkeg").join(formula.archive_root())),
        },
    };

    let prefix = resolve_prefix(args.prefix, &config, &formula);
    let deps = config.dependency_locator(&prefix);
    let opts = InstallOptions {
        toggle_layers: toggle_layers(&config, args.options.toggles()),
        prefix,
        source,
        toolchain: toolchain_overrides(&args.toolchain, &config),
        skip_test: args.skip_test,
    };

    let runner = SystemRunner::new(shell.is_verbose());
    let report = install(&formula, &opts, &deps, &runner, shell)?;

    shell.status(
        Status::Finished,
        format!(
            "{} {} ({} steps)",
            formula.name,
            formula.full_version(),
            report.steps.len()
        ),
    );

    Ok(())
}
