//! Boostkeg CLI - build and install Boost 1.65.1 from source

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

use boostkeg::util::shell::{ColorChoice, Shell};
use boostkeg::InstallError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    let shell = shell_for(&cli);

    if let Err(e) = run(cli, &shell) {
        shell.error(format!("{:#}", e));
        if let Some(err) = e.downcast_ref::<InstallError>() {
            report_details(err);
        }
        std::process::exit(1);
    }
}

fn report_details(err: &InstallError) {
    match err {
        InstallError::StepFailed { output_tail, .. } if !output_tail.is_empty() => {
            eprintln!("\n{}\n", output_tail);
        }
        InstallError::SmokeTestFailed { output, .. } if !output.is_empty() => {
            eprintln!("\n{}\n", output.trim_end());
        }
        InstallError::MissingDependency { searched, .. } => {
            for path in searched {
                eprintln!("  searched: {}", path.display());
            }
        }
        _ => {}
    }
    if let Some(help) = err.help() {
        eprintln!("help: {}", help);
    }
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("boostkeg=debug")
    } else if cli.quiet {
        EnvFilter::new("boostkeg=error")
    } else {
        EnvFilter::new("boostkeg=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// JSON mode is per command; errors are reported through the same shell.
fn shell_for(cli: &Cli) -> Shell {
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let json = match &cli.command {
        Commands::Plan(args) => args.json,
        Commands::Info(args) => args.json,
        _ => false,
    };
    Shell::from_flags(cli.quiet, cli.verbose, color, json)
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::Install(args) => commands::install::execute(args, shell),
        Commands::Plan(args) => commands::plan::execute(args, shell),
        Commands::Fetch(args) => commands::fetch::execute(args, shell),
        Commands::Caveats(args) => commands::caveats::execute(args, shell),
        Commands::Test(args) => commands::test::execute(args, shell),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
