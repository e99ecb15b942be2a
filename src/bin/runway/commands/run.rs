//! `runway run` command

use std::fs;

use anyhow::{bail, Context, Result};
use serde_json::json;

use crate::cli::RunArgs;
use runway::core::{ProjectCatalog, ReferenceOverrides, SourceKind};
use runway::util::diagnostic;
use runway::util::{GlobalContext, Shell, Status};
use runway::{ExecuteError, Orchestrator};

pub fn execute(ctx: &GlobalContext, args: RunArgs) -> Result<()> {
    let shell = Shell::from_flags(ctx.is_verbose(), !ctx.color(), args.json);

    let mut config = ctx.load_config();
    if let Some(secs) = args.timeout {
        config.execution.timeout_secs = secs;
    }

    let catalog = ProjectCatalog::load_or_default(&config.paths.catalog);
    let ecosystem = super::ecosystem_for(&catalog, &args.project, args.lang);

    let source = if args.local {
        Some(SourceKind::Local)
    } else if args.remote.is_some() {
        Some(SourceKind::Remote)
    } else {
        None
    };
    let overrides = ReferenceOverrides {
        source,
        remote_url: args.remote,
        entry_point: args.entry,
    };

    let stdin = match (args.stdin, args.stdin_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(
            fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let result = catalog
        .reference(ecosystem, &args.project, overrides)
        .and_then(|reference| {
            let orchestrator = Orchestrator::new(config);
            let spinner = shell.spinner(
                Status::Running,
                format!("{} ({})", reference.identifier(), ecosystem),
            );
            let result = orchestrator.execute(&reference, stdin.as_deref());
            spinner.finish();
            result
        });

    match result {
        Ok(outcome) => {
            if shell.is_json() {
                shell.json(&outcome);
            } else {
                shell.output(outcome.output());
                let summary = match outcome.exit_code() {
                    Some(code) => format!("{} (exit code {})", outcome.status(), code),
                    None => outcome.status().to_string(),
                };
                shell.status(Status::Finished, summary);
            }
            Ok(())
        }
        Err(err) => report(&shell, &args.project, err),
    }
}

fn report(shell: &Shell, project: &str, err: ExecuteError) -> Result<()> {
    if shell.is_json() {
        shell.json(&json!({
            "error": err.to_string(),
            "type": err.error_type(),
        }));
    } else {
        diagnostic::emit(&err.to_diagnostic(), shell.use_color());
    }
    bail!("could not run `{}`", project)
}
