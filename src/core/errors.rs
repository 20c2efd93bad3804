//! Install error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// A failure that terminates the current install invocation.
///
/// None of these are retried. Everything else (I/O context, malformed
/// config) travels as plain `anyhow` errors.
#[derive(Debug, Error, Diagnostic)]
pub enum InstallError {
    #[error("unknown option `{option}`")]
    #[diagnostic(
        code(boostkeg::options::unknown),
        help("Run `boostkeg info` to list the supported options")
    )]
    UnknownOption { option: String },

    #[error("conflicting options `--with-{name}` and `--without-{name}`")]
    #[diagnostic(
        code(boostkeg::options::conflict),
        help("Pass only one form of the option (the deprecated alias counts as `--with-{name}`)")
    )]
    ConflictingOption { name: String },

    #[error("checksum mismatch for {url}:\n  expected: {expected}\n  actual:   {actual}")]
    #[diagnostic(
        code(boostkeg::fetch::checksum),
        help("The download is corrupt or the upstream archive changed; remove it from the cache and retry")
    )]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("failed to download {url}: {reason}")]
    #[diagnostic(
        code(boostkeg::fetch::download),
        help("Check your network connection, or pass `--archive <file>` to use a local copy")
    )]
    Download { url: String, reason: String },

    #[error("missing dependency `{name}`: no install prefix found")]
    #[diagnostic(
        code(boostkeg::deps::missing),
        help("Install `{name}` first, or set `[dependencies] {name} = \"<prefix>\"` in .boostkeg/config.toml")
    )]
    MissingDependency { name: String, searched: Vec<PathBuf> },

    #[error("`{step}` failed with exit code {}", display_code(*code))]
    #[diagnostic(
        code(boostkeg::build::step_failed),
        help("Run with --verbose to see the full upstream build log")
    )]
    StepFailed {
        step: String,
        code: Option<i32>,
        output_tail: String,
    },

    #[error("smoke test failed during {stage} (exit code {})", display_code(*code))]
    #[diagnostic(code(boostkeg::test::failed))]
    SmokeTestFailed {
        stage: String,
        code: Option<i32>,
        output: String,
    },

    #[error("no C++ compiler found")]
    #[diagnostic(
        code(boostkeg::toolchain::not_found),
        help("Set the CXX environment variable, pass --cxx, or set `[toolchain] cxx` in the config")
    )]
    ToolchainNotFound,
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
