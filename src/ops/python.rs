//! Python execution: resolve, prepare the environment, run.

use std::path::{Component, Path, PathBuf};

use crate::core::{ExecutionOutcome, ProjectReference};
use crate::error::{ExecuteError, ExecuteResult};
use crate::ops::Orchestrator;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::process::{resolve_tool, ProcessBuilder};

const REQUIREMENTS: &str = "requirements.txt";

pub(crate) fn execute(
    orch: &Orchestrator,
    reference: &ProjectReference,
    stdin: Option<&str>,
) -> ExecuteResult<ExecutionOutcome> {
    let config = &orch.config.python;
    let main = reference.entry_point().unwrap_or(&config.default_main);
    validate_main_file(main)?;

    let (root, interpreter) = orch
        .locks
        .with_lock(reference.identifier(), || prepare(orch, reference, main))?;

    // Piped stdout is block-buffered; a killed program would lose its prompt.
    let cmd = ProcessBuilder::new(interpreter)
        .arg(main)
        .cwd(&root)
        .env("PYTHONUNBUFFERED", "1");
    orch.finish(orch.run(&cmd, stdin))
}

/// Resolve the project and pick its interpreter.
fn prepare(
    orch: &Orchestrator,
    reference: &ProjectReference,
    main: &str,
) -> ExecuteResult<(PathBuf, PathBuf)> {
    let config = &orch.config.python;
    let root = orch.resolver.resolve(reference)?;
    if !root.join(main).is_file() {
        return Err(ExecuteError::NotFound {
            what: "Main file",
            name: main.to_string(),
        });
    }

    let venv = orch.config.paths.venv_dir.join(reference.identifier());
    if config.install_requirements {
        prepare_venv(&root, &venv, &config.interpreter)?;
    }

    Ok((root, interpreter_for(&venv, &config.interpreter)))
}

/// Main files are relative paths inside the project.
fn validate_main_file(main: &str) -> ExecuteResult<()> {
    let path = Path::new(main);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if main.is_empty() || escapes {
        return Err(ExecuteError::invalid_request(format!(
            "main file must be a relative path inside the project: `{}`",
            main
        )));
    }
    Ok(())
}

/// The interpreter inside a virtual environment.
pub fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

/// The venv interpreter when the venv exists, else the configured one.
fn interpreter_for(venv: &Path, interpreter: &str) -> PathBuf {
    let python = venv_python(venv);
    if python.is_file() {
        python
    } else {
        resolve_tool(interpreter)
    }
}

/// Create `venv` and install the project's requirements into it.
///
/// Only runs when the project has a requirements file and no venv exists
/// yet. A failed step removes the half-built venv so the next run retries.
/// Returns whether a venv was created.
pub fn prepare_venv(root: &Path, venv: &Path, interpreter: &str) -> ExecuteResult<bool> {
    let requirements = root.join(REQUIREMENTS);
    if !requirements.is_file() || venv.exists() {
        return Ok(false);
    }

    if let Some(parent) = venv.parent() {
        ensure_dir(parent)?;
    }

    tracing::info!("Creating virtual environment at {}", venv.display());
    let create = ProcessBuilder::new(resolve_tool(interpreter))
        .args(["-m", "venv"])
        .arg(venv)
        .cwd(root);
    let install = ProcessBuilder::new(venv_python(venv))
        .args(["-m", "pip", "install", "-r"])
        .arg(&requirements)
        .cwd(root);

    let result = run_setup_step(&create, "venv").and_then(|()| {
        tracing::info!("Installing {}", REQUIREMENTS);
        run_setup_step(&install, "pip")
    });
    if let Err(e) = result {
        remove_dir_all_if_exists(venv)?;
        return Err(e);
    }

    Ok(true)
}

fn run_setup_step(cmd: &ProcessBuilder, tool: &str) -> ExecuteResult<()> {
    tracing::debug!("Running: {}", cmd.display_command());
    let output = cmd.exec().map_err(|e| ExecuteError::ProcessSpawn {
        program: cmd.get_program().display().to_string(),
        message: format!("{:#}", e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout)
        } else {
            stderr
        };
        return Err(ExecuteError::Build {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: message.into_owned(),
        });
    }
    Ok(())
}
