//! Sequential execution of the upstream build steps.
//!
//! The three steps (bootstrap, header generation, build/install) run one at
//! a time in the source directory. Each is awaited to completion; the first
//! non-zero exit aborts the pipeline.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;

use crate::builder::resolve::InstallPlan;
use crate::builder::toolchain::CommandSpec;
use crate::core::errors::InstallError;
use crate::util::process::ProcessBuilder;

/// Number of trailing output lines kept in a step failure.
const FAILURE_TAIL_LINES: usize = 40;

/// Which upstream step a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Bootstrap,
    Headers,
    Build,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Bootstrap => "bootstrap",
            StepKind::Headers => "headers",
            StepKind::Build => "build",
        }
    }
}

/// One command in the pipeline.
#[derive(Debug, Clone)]
pub struct Step {
    pub kind: StepKind,
    pub command: CommandSpec,
}

/// Output of a finished step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub kind: StepKind,
    /// Exit code; `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip)]
    pub duration: Duration,
}

impl StepResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last lines of combined output, for error reports.
    pub fn output_tail(&self, lines: usize) -> String {
        let combined: Vec<&str> = self.stdout.lines().chain(self.stderr.lines()).collect();
        let start = combined.len().saturating_sub(lines);
        combined[start..].join("\n")
    }
}

/// Progress notifications from [`Pipeline::run`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum PipelineEvent {
    #[serde(rename = "step-started")]
    StepStarted { step: StepKind, command: String },

    #[serde(rename = "step-finished")]
    StepFinished {
        step: StepKind,
        exit_code: Option<i32>,
        duration_ms: u64,
    },
}

/// Runs a command to completion and captures its output.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<CapturedOutput>;
}

/// Raw output from a [`CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs commands as real child processes.
///
/// With `stream` set, child output goes straight to the terminal and the
/// captured output is left empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    pub stream: bool,
}

impl SystemRunner {
    pub fn new(stream: bool) -> Self {
        SystemRunner { stream }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec, cwd: &Path) -> Result<CapturedOutput> {
        let mut process = ProcessBuilder::new(&command.program)
            .args(&command.args)
            .cwd(cwd);
        for (key, value) in &command.env {
            process = process.env(key, value);
        }

        if self.stream {
            let status = process.status()?;
            return Ok(CapturedOutput {
                exit_code: status.code(),
                ..CapturedOutput::default()
            });
        }

        let output = process.exec()?;
        Ok(CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// The ordered upstream steps for one install.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cwd: PathBuf,
    steps: Vec<Step>,
}

impl Pipeline {
    /// Bootstrap, then headers, then build, all run from `cwd`.
    pub fn from_plan(plan: &InstallPlan, cwd: impl Into<PathBuf>) -> Self {
        Pipeline {
            cwd: cwd.into(),
            steps: vec![
                Step {
                    kind: StepKind::Bootstrap,
                    command: plan.bootstrap.clone(),
                },
                Step {
                    kind: StepKind::Headers,
                    command: plan.headers.clone(),
                },
                Step {
                    kind: StepKind::Build,
                    command: plan.build.clone(),
                },
            ],
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(
        &self,
        runner: &dyn CommandRunner,
        mut on_event: impl FnMut(&PipelineEvent),
    ) -> Result<Vec<StepResult>> {
        let mut results = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let command_line = step.command.display_command();
            tracing::info!("Running {} step", step.kind.as_str());
            tracing::debug!("{}", command_line);
            on_event(&PipelineEvent::StepStarted {
                step: step.kind,
                command: command_line,
            });

            let start = Instant::now();
            let output = runner.run(&step.command, &self.cwd)?;
            let result = StepResult {
                kind: step.kind,
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
                duration: start.elapsed(),
            };

            on_event(&PipelineEvent::StepFinished {
                step: step.kind,
                exit_code: result.exit_code,
                duration_ms: result.duration.as_millis() as u64,
            });

            if !result.success() {
                return Err(InstallError::StepFailed {
                    step: step.kind.as_str().to_string(),
                    code: result.exit_code,
                    output_tail: result.output_tail(FAILURE_TAIL_LINES),
                }
                .into());
            }

            results.push(result);
        }

        Ok(results)
    }
}
