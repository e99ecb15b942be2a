//! Java execution: resolve, detect, build, locate, run.

use crate::builder::{self, classify, locate};
use crate::core::{
    BuildResult, EntryPoint, ExecutionOutcome, ProjectReference, ResolvedProject,
};
use crate::error::{ExecuteError, ExecuteResult};
use crate::ops::fallback::{is_failed_attempt, FallbackContext};
use crate::ops::Orchestrator;
use crate::util::process::resolve_tool;

pub(crate) fn execute(
    orch: &Orchestrator,
    reference: &ProjectReference,
    stdin: Option<&str>,
) -> ExecuteResult<ExecutionOutcome> {
    let entry_point = reference
        .entry_point()
        .map(str::parse::<EntryPoint>)
        .transpose()
        .map_err(ExecuteError::InvalidRequest)?;

    let config = &orch.config.java;
    let (project, build) = orch.locks.with_lock(reference.identifier(), || {
        let root = orch.resolver.resolve(reference)?;
        let project = ResolvedProject::new(root.clone(), classify(&root));
        let build = builder::build(&project.root, project.kind, entry_point.as_ref(), config);
        Ok::<_, ExecuteError>((project, build))
    })?;

    if !project.kind.is_declarative() {
        return run_adhoc(orch, reference, &project, entry_point.as_ref(), build, stdin);
    }

    // Build tool failures are terminal.
    let build = build?;
    let unit = locate(&project.root, project.kind, &build, entry_point.as_ref())?;
    let cmd = unit.command(resolve_tool(&config.java), &project.root);
    orch.finish(orch.run(&cmd, stdin))
}

/// Run a compiled ad-hoc tree, falling back to the configured strategies
/// when the primary attempt fails.
fn run_adhoc(
    orch: &Orchestrator,
    reference: &ProjectReference,
    project: &ResolvedProject,
    entry_point: Option<&EntryPoint>,
    build: ExecuteResult<BuildResult>,
    stdin: Option<&str>,
) -> ExecuteResult<ExecutionOutcome> {
    let config = &orch.config.java;

    let primary = match build {
        Err(e @ ExecuteError::MissingEntryPoint(_)) => return Err(e),
        Err(e) => Err(e),
        Ok(build) => {
            let unit = locate(&project.root, project.kind, &build, entry_point)?;
            tracing::info!("Class file found, executing Java application...");
            let cmd = unit.command(resolve_tool(&config.java), &project.root);
            Ok(orch.run(&cmd, stdin))
        }
    };

    let needs_fallback = match &primary {
        Ok(outcome) => is_failed_attempt(outcome),
        Err(_) => true,
    };
    let entry_point = match entry_point {
        Some(entry_point) if needs_fallback => entry_point,
        _ => return primary.and_then(|outcome| orch.finish(outcome)),
    };

    match &primary {
        Ok(outcome) => tracing::warn!("Java execution error: {}", outcome.failure_message()),
        Err(e) => tracing::warn!("Java execution error: {}", e),
    }

    let ctx = FallbackContext {
        project_id: reference.identifier(),
        root: &project.root,
        entry_point,
        build_output: project.root.join(&config.output_dir),
        config,
        executor: &orch.executor,
        locks: &orch.locks,
        stdin,
    };

    if let Some(outcome) = orch.fallbacks.run(&ctx) {
        return orch.finish(outcome);
    }

    // Every strategy failed: report the original attempt.
    match primary {
        Ok(outcome) if outcome.exited_with_error() => Ok(outcome),
        Ok(outcome) => Err(ExecuteError::ExecutionFailed(format!(
            "Error executing Java project: {}",
            outcome.failure_message()
        ))),
        Err(e) => Err(e),
    }
}
