//! Boost build driver.
//!
//! This module turns feature flags and toolchain facts into the upstream
//! `bootstrap.sh` / `b2` command lines and runs them as a sequential
//! pipeline.

pub mod pipeline;
pub mod resolve;
pub mod toolchain;
pub mod user_config;

pub use pipeline::{
    CapturedOutput, CommandRunner, Pipeline, PipelineEvent, Step, StepKind, StepResult,
    SystemRunner,
};
pub use resolve::{excluded_libraries, InstallLayout, InstallPlan, OptionResolver};
pub use toolchain::{detect_toolchain, CommandSpec, CompilerKind, ToolchainFacts, ToolchainOverrides};
pub use user_config::append_compiler_declaration;
