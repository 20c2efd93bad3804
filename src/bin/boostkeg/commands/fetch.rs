//! `boostkeg fetch` command

use anyhow::{Context, Result};

use crate::cli::FetchArgs;
use boostkeg::ops::{prepare_source, SourceSpec};
use boostkeg::sources::FetchOptions;
use boostkeg::util::config::load_default_config;
use boostkeg::util::shell::{Shell, Status};
use boostkeg::Formula;

pub fn execute(args: FetchArgs, shell: &Shell) -> Result<()> {
    let formula = Formula::boost();
    let config = load_default_config()?;

    let dest = match args.dest {
        Some(dest) => dest,
        None => std::env::current_dir()
            .context("failed to get current directory")?
            .join(formula.archive_root()),
    };

    let spec = SourceSpec::Archive {
        fetch: FetchOptions {
            archive: args.archive,
            cache_dir: config.cache_dir(),
            offline: args.offline || config.net.offline,
        },
        dest,
    };

    let source_dir = prepare_source(&formula, &spec, shell)?;
    shell.status(Status::Finished, format!("source tree at {}", source_dir.display()));

    Ok(())
}
