//! `boostkeg plan` command
//!
//! Resolves options and toolchain facts and prints the commands an install
//! would run. Nothing is written.

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::PlanArgs;
use crate::commands::{resolve_prefix, toggle_layers, toolchain_overrides};
use boostkeg::builder::resolve::user_config_line;
use boostkeg::builder::{detect_toolchain, InstallLayout};
use boostkeg::ops::plan_install;
use boostkeg::util::config::load_default_config;
use boostkeg::util::shell::Shell;
use boostkeg::Formula;

pub fn execute(args: PlanArgs, shell: &Shell) -> Result<()> {
    let formula = Formula::boost();
    let config = load_default_config()?;

    let toggles = toggle_layers(&config, args.options.toggles());
    let facts = detect_toolchain(&toolchain_overrides(&args.toolchain, &config))?;

    let prefix = resolve_prefix(args.prefix, &config, &formula);
    let source_dir = args
        .source
        .unwrap_or_else(|| PathBuf::from(formula.archive_root()));
    let deps = config.dependency_locator(&prefix);
    let layout = InstallLayout::new(source_dir, prefix);

    let (flags, plan) = plan_install(&formula, &toggles, &facts, &layout, &deps)?;

    if shell.is_json() {
        let value = serde_json::json!({
            "formula": formula.name,
            "version": formula.full_version(),
            "flags": flags,
            "toolchain": facts,
            "layout": layout,
            "user_config": {
                "path": layout.user_config_path(),
                "line": user_config_line(&facts.cxx),
            },
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("# {} {}", formula.name, formula.full_version());
    println!(
        "# icu4c={} single={} static={}",
        flags.icu_support, flags.single_threading, flags.static_linking
    );
    println!(
        "echo '{}' >> {}",
        user_config_line(&facts.cxx),
        layout.user_config_path().display()
    );
    println!("{}", plan.bootstrap.display_command());
    println!("{}", plan.headers.display_command());
    println!("{}", plan.build.display_command());

    Ok(())
}
