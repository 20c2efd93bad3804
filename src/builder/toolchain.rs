//! Host toolchain facts.
//!
//! The resolver never reads the environment itself. Everything it needs to
//! know about the compiler is collected once here into [`ToolchainFacts`].
//!
//! Detection priority for the C++ compiler:
//! 1. Explicit override (`--cxx` or `[toolchain] cxx` in config)
//! 2. The `CXX` environment variable
//! 3. Searching PATH for `c++`, `clang++`, `g++`

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::InstallError;
use crate::util::process::{find_executable, ProcessBuilder};

/// Compiler family, as far as the recipe cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerKind {
    Gcc,
    Clang,
    Other,
}

impl CompilerKind {
    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerKind::Gcc => "gcc",
            CompilerKind::Clang => "clang",
            CompilerKind::Other => "other",
        }
    }
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcc" => Ok(CompilerKind::Gcc),
            "clang" => Ok(CompilerKind::Clang),
            "other" => Ok(CompilerKind::Other),
            _ => Err(format!(
                "invalid compiler kind '{}'; expected 'gcc', 'clang', or 'other'",
                s
            )),
        }
    }
}

/// Immutable facts about the host toolchain for one install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainFacts {
    /// Compiler family
    pub compiler: CompilerKind,
    /// Path used to invoke the C++ compiler
    pub cxx: PathBuf,
    /// Compiler version, when it could be read from `--version`
    pub version: Option<String>,
    /// Parallelism passed to the external build tool as `-j`
    pub jobs: usize,
}

impl ToolchainFacts {
    /// Create facts without a known compiler version.
    pub fn new(compiler: CompilerKind, cxx: impl Into<PathBuf>, jobs: usize) -> Self {
        ToolchainFacts {
            compiler,
            cxx: cxx.into(),
            version: None,
            jobs: jobs.max(1),
        }
    }
}

/// User-supplied overrides applied on top of detection.
#[derive(Debug, Clone, Default)]
pub struct ToolchainOverrides {
    pub cxx: Option<PathBuf>,
    pub compiler: Option<CompilerKind>,
    pub jobs: Option<usize>,
}

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "./b2")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Whether an argument is present verbatim.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Display the command for logs and plans.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)?)").expect("valid version regex"));

/// Detect the toolchain facts for this host.
pub fn detect_toolchain(overrides: &ToolchainOverrides) -> Result<ToolchainFacts> {
    let cxx = match &overrides.cxx {
        Some(cxx) => cxx.clone(),
        None => find_cxx().ok_or(InstallError::ToolchainNotFound)?,
    };

    let version_output = ProcessBuilder::new(&cxx)
        .arg("--version")
        .exec()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).into_owned());

    let compiler = match overrides.compiler {
        Some(kind) => kind,
        None => match &version_output {
            Some(text) => classify_version_output(text),
            None => classify_by_name(&cxx),
        },
    };
    let version = version_output.as_deref().and_then(parse_version);
    let jobs = overrides.jobs.unwrap_or_else(default_jobs);

    tracing::info!(
        "Using {} compiler {} ({})",
        compiler,
        cxx.display(),
        version.as_deref().unwrap_or("unknown version")
    );

    Ok(ToolchainFacts {
        compiler,
        cxx,
        version,
        jobs: jobs.max(1),
    })
}

/// Find a C++ compiler from the environment or PATH.
fn find_cxx() -> Option<PathBuf> {
    if let Ok(cxx) = std::env::var("CXX") {
        if let Some(path) = find_executable(&cxx) {
            return Some(path);
        }
        tracing::warn!("CXX={} is not executable, searching PATH", cxx);
    }

    ["c++", "clang++", "g++"]
        .iter()
        .find_map(|name| find_executable(name))
}

/// Classify a compiler from its `--version` banner.
///
/// Clang is checked first: Apple's `g++` shim reports itself as clang.
pub fn classify_version_output(text: &str) -> CompilerKind {
    let text = text.to_lowercase();
    if text.contains("clang") {
        CompilerKind::Clang
    } else if text.contains("gcc") || text.contains("free software foundation") {
        CompilerKind::Gcc
    } else {
        CompilerKind::Other
    }
}

fn classify_by_name(cxx: &Path) -> CompilerKind {
    let name = cxx
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("clang") {
        CompilerKind::Clang
    } else if name.contains("g++") || name.contains("gcc") {
        CompilerKind::Gcc
    } else {
        CompilerKind::Other
    }
}

/// Extract the first dotted version number from a `--version` banner.
pub fn parse_version(text: &str) -> Option<String> {
    let first_line = text.lines().next()?;
    VERSION_RE
        .captures(first_line)
        .map(|c| c[1].to_string())
}

/// Default build parallelism: the number of available CPUs.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
