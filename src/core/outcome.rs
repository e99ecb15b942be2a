//! Execution outcomes.

use std::fmt;

use serde::Serialize;

/// Terminal state of a bounded execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeStatus {
    /// The process exited before the deadline
    Completed,
    /// The deadline passed, but the program had already produced output
    TimedOutWithOutput,
    /// The deadline passed in silence
    TimedOutNoOutput,
    /// The process could not be run at all
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Completed => "completed",
            OutcomeStatus::TimedOutWithOutput => "timedOutWithOutput",
            OutcomeStatus::TimedOutNoOutput => "timedOutNoOutput",
            OutcomeStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a program under a wall-clock budget.
///
/// Constructed only through the associated functions, which keep the
/// status consistent with the captured text: `TimedOutWithOutput` always
/// has some output and `Failed` always has a cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    status: OutcomeStatus,
    stdout: String,
    stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
}

impl ExecutionOutcome {
    /// The process exited on its own.
    pub fn completed(stdout: String, stderr: String, exit_code: Option<i32>) -> Self {
        ExecutionOutcome {
            status: OutcomeStatus::Completed,
            stdout,
            stderr,
            exit_code,
            cause: None,
        }
    }

    /// The deadline passed; the status depends on whether anything was captured.
    pub fn timed_out(stdout: String, stderr: String) -> Self {
        let status = if stdout.is_empty() && stderr.is_empty() {
            OutcomeStatus::TimedOutNoOutput
        } else {
            OutcomeStatus::TimedOutWithOutput
        };
        ExecutionOutcome {
            status,
            stdout,
            stderr,
            exit_code: None,
            cause: None,
        }
    }

    /// The program could not be run.
    pub fn failed(cause: impl Into<String>) -> Self {
        let cause = cause.into();
        let cause = if cause.trim().is_empty() {
            "execution failed".to_string()
        } else {
            cause
        };
        ExecutionOutcome {
            status: OutcomeStatus::Failed,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            cause: Some(cause),
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Human-readable cause for `Failed` outcomes.
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// The text shown to the user: stdout, or stderr when stdout is empty.
    pub fn output(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }

    /// Whether the caller should treat this outcome as a success.
    ///
    /// A run that timed out after printing something is a long-running or
    /// interactive program, not a failure.
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            OutcomeStatus::Completed | OutcomeStatus::TimedOutWithOutput
        )
    }

    /// Whether the process ran to completion with a non-zero exit code.
    pub fn exited_with_error(&self) -> bool {
        self.status == OutcomeStatus::Completed && self.exit_code.is_some_and(|c| c != 0)
    }

    /// One-line description of why this outcome is not usable.
    pub fn failure_message(&self) -> String {
        match self.status {
            OutcomeStatus::Failed => self.cause.clone().unwrap_or_default(),
            OutcomeStatus::TimedOutNoOutput => "program produced no output".to_string(),
            OutcomeStatus::Completed => {
                let code = self
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                let detail = self.output().trim();
                if detail.is_empty() {
                    format!("process exited with code {}", code)
                } else {
                    format!("process exited with code {}\n{}", code, detail)
                }
            }
            OutcomeStatus::TimedOutWithOutput => String::new(),
        }
    }
}
