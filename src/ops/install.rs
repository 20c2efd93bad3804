//! The install operation.
//!
//! Order of work, each step finishing before the next starts:
//! 1. Resolve feature flags (bad toggles fail before anything is fetched)
//! 2. Collect toolchain facts
//! 3. Prepare a verified, patched source tree
//! 4. Resolve the command lines (missing dependencies fail here)
//! 5. Declare the compiler in `user-config.jam`, once per tree
//! 6. Run bootstrap, headers and build
//! 7. Compute caveats and run the smoke test

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::builder::pipeline::{CommandRunner, Pipeline, PipelineEvent, StepResult};
use crate::builder::resolve::{user_config_line, InstallLayout, InstallPlan, OptionResolver};
use crate::builder::toolchain::{detect_toolchain, ToolchainFacts, ToolchainOverrides};
use crate::builder::user_config::append_compiler_declaration;
use crate::core::dependency::DependencyLocator;
use crate::core::formula::Formula;
use crate::core::options::FeatureFlags;
use crate::ops::caveats::caveats;
use crate::ops::fetch::{prepare_source, SourceSpec};
use crate::ops::smoke_test::{run_smoke_test, SmokeTestReport};
use crate::util::shell::{format_duration, Shell, Spinner, Status};

/// Inputs to [`install`].
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// `--with-*`/`--without-*` toggle layers, lowest precedence first
    pub toggle_layers: Vec<Vec<String>>,
    /// Install prefix
    pub prefix: PathBuf,
    /// Where the source tree comes from
    pub source: SourceSpec,
    /// Compiler and parallelism overrides
    pub toolchain: ToolchainOverrides,
    /// Skip the post-install smoke test
    pub skip_test: bool,
}

/// What an install did.
#[derive(Debug, Serialize)]
pub struct InstallReport {
    pub flags: FeatureFlags,
    pub toolchain: ToolchainFacts,
    pub plan: InstallPlan,
    pub steps: Vec<StepResult>,
    pub caveats: String,
    #[serde(skip)]
    pub smoke_test: Option<SmokeTestReport>,
}

/// Resolve toggles and build the command lines without running anything.
pub fn plan_install(
    formula: &Formula,
    toggle_layers: &[Vec<String>],
    facts: &ToolchainFacts,
    layout: &InstallLayout,
    deps: &dyn DependencyLocator,
) -> Result<(FeatureFlags, InstallPlan)> {
    let flags = FeatureFlags::resolve_layered(
        &formula.options,
        &formula.deprecated_options,
        toggle_layers,
    )?;
    let plan = OptionResolver::new(flags, facts, layout, deps).resolve()?;
    Ok((flags, plan))
}

/// Build and install the formula.
pub fn install(
    formula: &Formula,
    options: &InstallOptions,
    deps: &dyn DependencyLocator,
    runner: &dyn CommandRunner,
    shell: &Shell,
) -> Result<InstallReport> {
    let start = Instant::now();

    let flags = FeatureFlags::resolve_layered(
        &formula.options,
        &formula.deprecated_options,
        &options.toggle_layers,
    )?;
    tracing::debug!("resolved flags: {:?}", flags);

    let facts = detect_toolchain(&options.toolchain)?;
    let source_dir = prepare_source(formula, &options.source, shell)?;
    let layout = InstallLayout::new(&source_dir, &options.prefix);

    shell.status(
        Status::Resolving,
        format!("{} with {} ({} jobs)", formula.name, facts.compiler, facts.jobs),
    );
    let plan = OptionResolver::new(flags, &facts, &layout, deps).resolve()?;

    append_compiler_declaration(&layout.user_config_path(), &user_config_line(&facts.cxx))?;

    let mut _spinner: Option<Spinner> = None;
    let steps = Pipeline::from_plan(&plan, &source_dir).run(runner, |event| {
        if shell.is_json() {
            if let Ok(value) = serde_json::to_value(event) {
                shell.json_event(&value);
            }
        }
        match event {
            PipelineEvent::StepStarted { step, .. } => {
                _spinner = Some(shell.spinner(Status::Running, step.as_str()));
            }
            PipelineEvent::StepFinished { .. } => {
                _spinner = None;
            }
        }
    })?;

    shell.status(
        Status::Installed,
        format!(
            "{} to {} in {}",
            formula.name,
            options.prefix.display(),
            format_duration(start.elapsed())
        ),
    );

    let caveats = caveats(&layout.lib_dir())?;
    if !caveats.is_empty() {
        shell.status(Status::Caveats, caveats.trim_end());
    }

    let smoke_test = if options.skip_test {
        shell.status(Status::Skipped, "smoke test");
        None
    } else {
        shell.status(Status::Testing, "compiling and running the split fixture");
        let report = run_smoke_test(&facts.cxx, &options.prefix)?;
        shell.status(Status::Passed, format!("smoke test in {}", format_duration(report.duration)));
        Some(report)
    };

    Ok(InstallReport {
        flags,
        toolchain: facts,
        plan,
        steps,
        caveats,
        smoke_test,
    })
}
