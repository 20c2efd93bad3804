//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use boostkeg::builder::ToolchainOverrides;
use boostkeg::CompilerKind;

/// Boostkeg - build and install Boost 1.65.1 from source
#[derive(Parser)]
#[command(name = "boostkeg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (streams upstream build output)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, patch, build and install Boost
    Install(InstallArgs),

    /// Print the resolved build commands without running them
    Plan(PlanArgs),

    /// Download, verify, extract and patch the source tree
    Fetch(FetchArgs),

    /// Show post-install caveats for an install prefix
    Caveats(CaveatsArgs),

    /// Compile and run a small program against an install prefix
    Test(TestArgs),

    /// Show formula metadata and options
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Build option toggles.
///
/// Both forms of an option may be given; the combination is rejected when
/// flags are resolved rather than by clap so config-file toggles are checked
/// the same way.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Build regexp engine with icu support
    #[arg(long)]
    pub with_icu4c: bool,

    #[arg(long, hide = true)]
    pub without_icu4c: bool,

    /// Deprecated alias for --with-icu4c
    #[arg(long, hide = true)]
    pub with_icu: bool,

    #[arg(long, hide = true)]
    pub with_single: bool,

    /// Disable building single-threading variant
    #[arg(long)]
    pub without_single: bool,

    #[arg(long, hide = true)]
    pub with_static: bool,

    /// Disable building static library variant
    #[arg(long)]
    pub without_static: bool,
}

impl OptionArgs {
    /// The toggles given on the command line, as `--with-*`/`--without-*` strings.
    pub fn toggles(&self) -> Vec<String> {
        [
            (self.with_icu4c, "--with-icu4c"),
            (self.without_icu4c, "--without-icu4c"),
            (self.with_icu, "--with-icu"),
            (self.with_single, "--with-single"),
            (self.without_single, "--without-single"),
            (self.with_static, "--with-static"),
            (self.without_static, "--without-static"),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .map(|(_, flag)| flag.to_string())
        .collect()
    }
}

/// Compiler selection shared by commands that need one.
#[derive(Args, Debug, Clone, Default)]
pub struct ToolchainArgs {
    /// C++ compiler to build with (defaults to $CXX, then c++/clang++/g++)
    #[arg(long, env = "CXX")]
    pub cxx: Option<PathBuf>,

    /// Compiler family, skipping detection
    #[arg(long, value_parser = parse_compiler)]
    pub compiler: Option<CompilerKind>,

    /// Number of parallel jobs for b2
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl ToolchainArgs {
    pub fn overrides(&self) -> ToolchainOverrides {
        ToolchainOverrides {
            cxx: self.cxx.clone(),
            compiler: self.compiler,
            jobs: self.jobs,
        }
    }
}

fn parse_compiler(s: &str) -> Result<CompilerKind, String> {
    s.parse::<CompilerKind>().map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    #[command(flatten)]
    pub toolchain: ToolchainArgs,

    /// Install prefix
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Use an already-extracted source tree (skips download and checksum)
    #[arg(long, conflicts_with = "archive")]
    pub source: Option<PathBuf>,

    /// Use a local release archive instead of downloading
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Directory the archive is extracted into
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Never download; use the cache or --archive
    #[arg(long)]
    pub offline: bool,

    /// Skip the post-install smoke test
    #[arg(long)]
    pub skip_test: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    #[command(flatten)]
    pub toolchain: ToolchainArgs,

    /// Install prefix
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Source tree the commands would run in
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Directory to extract into (defaults to ./boost_1_65_1)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Use a local release archive instead of downloading
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Never download; use the cache or --archive
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args)]
pub struct CaveatsArgs {
    /// Install prefix to inspect
    #[arg(long)]
    pub prefix: Option<PathBuf>,
}

#[derive(Args)]
pub struct TestArgs {
    /// Install prefix to test against
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// C++ compiler for the test program
    #[arg(long, env = "CXX")]
    pub cxx: Option<PathBuf>,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_toggles_from_flags() {
        let cli = Cli::parse_from(["boostkeg", "plan", "--with-icu", "--without-static"]);
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(args.options.toggles(), vec!["--with-icu", "--without-static"]);
    }
}
