//! `boostkeg info` command

use anyhow::Result;

use crate::cli::InfoArgs;
use boostkeg::ops::format_info;
use boostkeg::Formula;

pub fn execute(args: InfoArgs) -> Result<()> {
    let formula = Formula::boost();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&formula)?);
    } else {
        print!("{}", format_info(&formula));
    }

    Ok(())
}
