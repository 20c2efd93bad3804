//! `boostkeg caveats` command

use anyhow::Result;

use crate::cli::CaveatsArgs;
use crate::commands::resolve_prefix;
use boostkeg::ops::caveats;
use boostkeg::util::config::load_default_config;
use boostkeg::util::shell::Shell;
use boostkeg::Formula;

pub fn execute(args: CaveatsArgs, shell: &Shell) -> Result<()> {
    let formula = Formula::boost();
    let config = load_default_config()?;
    let prefix = resolve_prefix(args.prefix, &config, &formula);

    let text = caveats(&prefix.join("lib"))?;
    if text.is_empty() {
        shell.note(format!("no caveats for {}", prefix.display()));
    } else {
        print!("{}", text);
    }

    Ok(())
}
