//! User-friendly diagnostic messages.
//!
//! Every error shown on the terminal carries the root cause, the tail of
//! any tool output behind it, and a suggested fix when one is known.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when a project directory is missing.
    pub const PROJECT_NOT_FOUND: &str =
        "help: Run `runway projects` to see catalogued projects, or check JAVA_PROJECTS_DIR";

    /// Suggestion when a remote fetch fails.
    pub const FETCH_FAILED: &str =
        "help: Check the repository URL and your network connection";

    /// Suggestion when an ad-hoc project has no entry point.
    pub const MISSING_ENTRY_POINT: &str =
        "help: Pass `--entry <fully.qualified.Main>` or set `entry_point` in the catalog";

    /// Suggestion when a runtime or compiler is missing.
    pub const RUNTIME_MISSING: &str =
        "help: Install a JDK / Python and make sure it is on PATH, or set it in config.toml";

    /// Suggestion when the program stayed silent.
    pub const SILENT_PROGRAM: &str =
        "help: Raise `execution.timeout_secs` if the program needs longer to start";

    /// Suggestion when a declarative build fails.
    pub const BUILD_FAILED: &str = "help: Run the project's own build locally to see the full log";
}

/// Tool output lines kept under a diagnostic; earlier lines are elided.
const MAX_CONTEXT_LINES: usize = 20;

/// An error as shown on the terminal.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Headline
    pub message: String,
    /// Captured tool output (compiler errors, build log tail)
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// A multi-line message is split: the first line becomes the headline
    /// and the rest is kept as context, trimmed to its last lines.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let mut lines = message.lines();
        let headline = lines.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = lines.filter(|l| !l.trim().is_empty()).collect();

        let mut diag = Diagnostic {
            message: headline,
            context: Vec::new(),
            suggestions: Vec::new(),
        };
        let skipped = rest.len().saturating_sub(MAX_CONTEXT_LINES);
        if skipped > 0 {
            diag = diag.with_context(format!("... {} earlier lines", skipped));
        }
        for line in &rest[skipped..] {
            diag = diag.with_context(*line);
        }
        diag
    }

    /// Add a context line.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let label = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };
        let mut output = format!("{}: {}\n", label, self.message);

        for ctx in &self.context {
            output.push_str(&format!("  | {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            for suggestion in &self.suggestions {
                output.push_str(&format!("{}\n", suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_output_becomes_context() {
        let diag = Diagnostic::error(
            "compilation failed: src/a/b/Main.java:3: error: ';' expected\n    int x = 1\n             ^\n\n1 error\n",
        )
        .with_suggestion(suggestions::RUNTIME_MISSING);

        let output = diag.format(false);
        assert!(output.starts_with("error: compilation failed: src/a/b/Main.java:3"));
        assert!(output.contains("  |     int x = 1"));
        assert!(output.contains("  | 1 error"));
        assert!(output.contains("help: Install a JDK"));
        assert_eq!(diag.context.len(), 3);
    }

    #[test]
    fn test_long_build_log_keeps_the_tail() {
        let log: Vec<String> = (1..=50).map(|i| format!("[INFO] line {}", i)).collect();
        let diag = Diagnostic::error(format!("mvn build failed\n{}", log.join("\n")));

        assert_eq!(diag.message, "mvn build failed");
        assert_eq!(diag.context.len(), MAX_CONTEXT_LINES + 1);
        assert_eq!(diag.context[0], "... 30 earlier lines");
        assert_eq!(diag.context.last().unwrap(), "[INFO] line 50");
    }

    #[test]
    fn test_single_line_has_no_context() {
        let diag = Diagnostic::error("Project not found: ghost");
        assert!(diag.context.is_empty());
        assert_eq!(diag.to_string(), "error: Project not found: ghost\n");
    }
}
