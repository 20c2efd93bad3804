//! Test utilities for Boostkeg unit tests.
//!
//! The upstream build steps take minutes and need a real Boost tree, so
//! tests run them through [`RecordingRunner`] instead of [`SystemRunner`].
//!
//! [`SystemRunner`]: crate::builder::SystemRunner

pub mod fixtures;

use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;

use crate::builder::pipeline::{CapturedOutput, CommandRunner};
use crate::builder::toolchain::CommandSpec;

pub use fixtures::*;

/// Canned output for a command.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Records every command it is asked to run and answers with canned output.
///
/// Commands succeed unless a [`fail_on`](RecordingRunner::fail_on) pattern
/// matches the program path.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    failures: Vec<(String, MockProcessOutput)>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Fail any command whose program path contains `program`.
    pub fn fail_on(mut self, program: &str, status: i32, stderr: &str) -> Self {
        self.failures
            .push((program.to_string(), MockProcessOutput::failure(status, stderr)));
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec, _cwd: &Path) -> Result<CapturedOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }

        let program = command.program.to_string_lossy();
        let output = self
            .failures
            .iter()
            .find(|(pattern, _)| program.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default();

        Ok(CapturedOutput {
            exit_code: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner() {
        let runner = RecordingRunner::new().fail_on("b2", 2, "boom");

        let ok = runner
            .run(&CommandSpec::new("/src/bootstrap.sh"), Path::new("/src"))
            .unwrap();
        assert_eq!(ok.exit_code, Some(0));

        let failed = runner
            .run(&CommandSpec::new("/src/b2").arg("headers"), Path::new("/src"))
            .unwrap();
        assert_eq!(failed.exit_code, Some(2));
        assert_eq!(failed.stderr, "boom");

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].has_arg("headers"));
    }
}
