//! Shell output for the CLI.
//!
//! Status lines go to stderr, program output and JSON documents go to
//! stdout. JSON mode suppresses all human output so stdout stays parseable.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

/// Shell output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMode {
    /// Status lines, spinners, and optional colors
    Human { verbose: bool, color: bool },
    /// A single JSON document on stdout
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbose: false,
            color: io::stderr().is_terminal(),
        }
    }
}

/// Semantic status of a message; the shell picks the formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Fetching,
    Building,
    Running,
    Detected,
    Finished,
    Removed,
    Info,
    Warning,
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Fetching => "Fetching",
            Status::Building => "Building",
            Status::Running => "Running",
            Status::Detected => "Detected",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Info => "Info",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Removed | Status::Detected => "\x1b[1;32m",
            Status::Fetching | Status::Building | Status::Running => "\x1b[1;36m",
            Status::Info => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Central shell for CLI output.
#[derive(Debug, Default)]
pub struct Shell {
    mode: ShellMode,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        Shell { mode }
    }

    /// Create a shell from CLI flags. JSON takes precedence.
    pub fn from_flags(verbose: bool, no_color: bool, json: bool) -> Self {
        if json {
            return Shell::new(ShellMode::Json);
        }
        Shell::new(ShellMode::Human {
            verbose,
            color: !no_color && io::stderr().is_terminal(),
        })
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self.mode, ShellMode::Human { verbose: true, .. })
    }

    pub fn use_color(&self) -> bool {
        matches!(self.mode, ShellMode::Human { color: true, .. })
    }

    /// Print a status line: `{status:>12} {message}`.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print program output verbatim to stdout.
    pub fn output(&self, text: &str) {
        if self.is_json() || text.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        if !text.ends_with('\n') {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    /// Print a JSON document to stdout. Ignored in human mode.
    pub fn json<T: Serialize>(&self, value: &T) {
        if !self.is_json() {
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("failed to serialize output: {}", e),
        }
    }

    /// Start a spinner for a long step.
    ///
    /// Spinners are only drawn for an interactive, non-verbose human shell;
    /// otherwise the message is printed as a plain status line.
    pub fn spinner(&self, status: Status, msg: impl Display) -> Spinner {
        let interactive = !self.is_json() && !self.is_verbose() && io::stderr().is_terminal();
        if !interactive {
            self.status(status, &msg);
            return Spinner { pb: None };
        }

        let pb = ProgressBar::new_spinner();
        let template = if self.use_color() {
            "{spinner:.cyan} {msg}"
        } else {
            "{spinner} {msg}"
        };
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style);
        }
        pb.set_message(format!("{} {}", status.as_str(), msg));
        pb.enable_steady_tick(Duration::from_millis(100));
        Spinner { pb: Some(pb) }
    }

    fn format_status(&self, status: Status) -> String {
        if self.use_color() {
            format!("{}{:>12}\x1b[0m", status.color_code(), status.as_str())
        } else {
            format!("{:>12}", status.as_str())
        }
    }
}

/// A running spinner; cleared when finished or dropped.
pub struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn finish(self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_takes_precedence() {
        let shell = Shell::from_flags(true, false, true);
        assert!(shell.is_json());
        assert!(!shell.is_verbose());
        assert!(!shell.use_color());
    }

    #[test]
    fn test_plain_status_format() {
        let shell = Shell::new(ShellMode::Human {
            verbose: false,
            color: false,
        });
        assert_eq!(shell.format_status(Status::Running), "     Running");
    }

    #[test]
    fn test_spinner_without_terminal_is_plain() {
        let shell = Shell::new(ShellMode::Json);
        let spinner = shell.spinner(Status::Building, "demo");
        assert!(spinner.pb.is_none());
        spinner.finish();
    }
}
