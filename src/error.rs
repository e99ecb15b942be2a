//! Execution error taxonomy.
//!
//! Internals use `anyhow` with context; the orchestrator converts failures
//! into an [`ExecuteError`] at its boundary so that callers (the HTTP API and
//! the CLI) can map each kind to a status code and a diagnostic.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Result alias for orchestrator operations.
pub type ExecuteResult<T> = std::result::Result<T, ExecuteError>;

/// Errors surfaced by a single execution request.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ExecuteError {
    #[error("{what} not found: {name}")]
    #[diagnostic(code(runway::resolve::not_found))]
    NotFound { what: &'static str, name: String },

    #[error("failed to fetch {url}: {message}")]
    #[diagnostic(code(runway::resolve::fetch))]
    Fetch { url: String, message: String },

    #[error("{tool} build failed with exit code {code:?}\n{stderr}")]
    #[diagnostic(code(runway::build::failed))]
    Build {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{0}")]
    #[diagnostic(code(runway::build::missing_entry_point))]
    MissingEntryPoint(String),

    #[error("compilation failed: {message}")]
    #[diagnostic(code(runway::build::compile))]
    Compile { message: String },

    #[error("no runnable jar/bundle and no entry point specified")]
    #[diagnostic(code(runway::locate::not_runnable))]
    NotRunnable,

    #[error("failed to start `{program}`: {message}")]
    #[diagnostic(code(runway::run::spawn))]
    ProcessSpawn { program: String, message: String },

    #[error("program produced no output within {secs}s")]
    #[diagnostic(code(runway::run::timeout))]
    TimedOutNoOutput { secs: u64 },

    #[error("{0}")]
    #[diagnostic(code(runway::run::failed))]
    ExecutionFailed(String),

    #[error("invalid request: {0}")]
    #[diagnostic(code(runway::request::invalid))]
    InvalidRequest(String),

    #[error(transparent)]
    #[diagnostic(code(runway::internal))]
    Other(#[from] anyhow::Error),
}

impl ExecuteError {
    /// Create a not-found error for a project.
    pub fn project_not_found(name: impl Into<String>) -> Self {
        ExecuteError::NotFound {
            what: "Project",
            name: name.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ExecuteError::InvalidRequest(msg.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ExecuteError::NotFound { .. } => 404,
            ExecuteError::Fetch { .. } => 502,
            ExecuteError::MissingEntryPoint(_) | ExecuteError::InvalidRequest(_) => 400,
            ExecuteError::Build { .. }
            | ExecuteError::Compile { .. }
            | ExecuteError::NotRunnable => 422,
            ExecuteError::TimedOutNoOutput { .. } => 504,
            ExecuteError::ProcessSpawn { .. }
            | ExecuteError::ExecutionFailed(_)
            | ExecuteError::Other(_) => 500,
        }
    }

    /// Short machine-readable kind.
    pub fn error_type(&self) -> &'static str {
        match self {
            ExecuteError::NotFound { .. } => "not_found",
            ExecuteError::Fetch { .. } => "fetch_error",
            ExecuteError::Build { .. } => "build_error",
            ExecuteError::MissingEntryPoint(_) => "missing_entry_point",
            ExecuteError::Compile { .. } => "compile_error",
            ExecuteError::NotRunnable => "not_runnable",
            ExecuteError::ProcessSpawn { .. } => "process_spawn_error",
            ExecuteError::TimedOutNoOutput { .. } => "timeout",
            ExecuteError::ExecutionFailed(_) => "execution_failed",
            ExecuteError::InvalidRequest(_) => "invalid_request",
            ExecuteError::Other(_) => "internal_error",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ExecuteError::NotFound { .. } => diag.with_suggestion(suggestions::PROJECT_NOT_FOUND),
            ExecuteError::Fetch { .. } => diag.with_suggestion(suggestions::FETCH_FAILED),
            ExecuteError::Build { .. } => diag.with_suggestion(suggestions::BUILD_FAILED),
            ExecuteError::MissingEntryPoint(_) | ExecuteError::NotRunnable => {
                diag.with_suggestion(suggestions::MISSING_ENTRY_POINT)
            }
            ExecuteError::ProcessSpawn { .. } => diag.with_suggestion(suggestions::RUNTIME_MISSING),
            ExecuteError::TimedOutNoOutput { .. } => {
                diag.with_suggestion(suggestions::SILENT_PROGRAM)
            }
            _ => diag,
        }
    }
}
