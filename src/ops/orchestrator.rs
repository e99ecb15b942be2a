//! The execution pipeline shared by the CLI and the HTTP API.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{Ecosystem, ExecutionOutcome, OutcomeStatus, ProjectReference, SourceKind};
use crate::error::{ExecuteError, ExecuteResult};
use crate::ops::fallback::FallbackSequencer;
use crate::ops::{java, python};
use crate::runner::BoundedExecutor;
use crate::sources::{GitFetcher, KeyedLocks, RepositoryFetcher, SourceResolver};
use crate::util::config::Config;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::process::ProcessBuilder;

/// Resolves, builds and runs projects.
///
/// One orchestrator serves all requests. Resolve and build for a project
/// identifier are serialized through [`KeyedLocks`]; running the program
/// happens outside the lock.
pub struct Orchestrator {
    pub(crate) config: Config,
    pub(crate) resolver: SourceResolver,
    pub(crate) locks: KeyedLocks,
    pub(crate) executor: BoundedExecutor,
    pub(crate) fallbacks: FallbackSequencer,
}

impl Orchestrator {
    /// Create an orchestrator that fetches remote projects with git.
    pub fn new(config: Config) -> Self {
        Orchestrator::with_fetcher(config, Box::new(GitFetcher::new()))
    }

    /// Create an orchestrator with a custom repository fetcher.
    pub fn with_fetcher(config: Config, fetcher: Box<dyn RepositoryFetcher>) -> Self {
        let resolver = SourceResolver::new(&config.paths, fetcher);
        let executor = BoundedExecutor::new(config.execution.timeout());
        Orchestrator {
            config,
            resolver,
            locks: KeyedLocks::new(),
            executor,
            fallbacks: FallbackSequencer::default(),
        }
    }

    /// Replace the ad-hoc fallback strategies.
    pub fn with_fallbacks(mut self, fallbacks: FallbackSequencer) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    /// Execute a project in whichever ecosystem it belongs to.
    pub fn execute(
        &self,
        reference: &ProjectReference,
        stdin: Option<&str>,
    ) -> ExecuteResult<ExecutionOutcome> {
        match reference.ecosystem() {
            Ecosystem::Java => self.execute_java(reference, stdin),
            Ecosystem::Python => self.execute_python(reference, stdin),
        }
    }

    /// Resolve, build, and run a Java project.
    pub fn execute_java(
        &self,
        reference: &ProjectReference,
        stdin: Option<&str>,
    ) -> ExecuteResult<ExecutionOutcome> {
        tracing::info!("Executing {}", reference);
        let result = java::execute(self, reference, stdin);
        log_result(reference, &result);
        result
    }

    /// Resolve and run a Python project.
    pub fn execute_python(
        &self,
        reference: &ProjectReference,
        stdin: Option<&str>,
    ) -> ExecuteResult<ExecutionOutcome> {
        tracing::info!("Executing {}", reference);
        let result = python::execute(self, reference, stdin);
        log_result(reference, &result);
        result
    }

    /// Remove ad-hoc build outputs of a project, and optionally its remote
    /// working copy and virtual environment.
    ///
    /// Returns the directories that were removed.
    pub fn clean(&self, reference: &ProjectReference, cache: bool) -> Result<Vec<PathBuf>> {
        self.locks.with_lock(reference.identifier(), || -> Result<Vec<PathBuf>> {
            let root = self.resolver.target_path(reference);
            let mut candidates = Vec::new();

            if reference.ecosystem() == Ecosystem::Java {
                candidates.push(root.join(&self.config.java.output_dir));
                candidates.push(root.join(&self.config.java.fallback_output_dir));
            }
            if cache {
                if reference.source() == SourceKind::Remote {
                    candidates.push(root.clone());
                }
                if reference.ecosystem() == Ecosystem::Python {
                    candidates.push(self.config.paths.venv_dir.join(reference.identifier()));
                }
            }

            let mut removed = Vec::new();
            for dir in candidates {
                if dir.exists() {
                    remove_dir_all_if_exists(&dir)?;
                    tracing::debug!("Removed {}", dir.display());
                    removed.push(dir);
                }
            }
            Ok(removed)
        })
    }

    /// Run a command through the bounded executor.
    pub(crate) fn run(&self, cmd: &ProcessBuilder, stdin: Option<&str>) -> ExecutionOutcome {
        self.executor.execute(cmd, stdin)
    }

    /// Turn a terminal outcome into the caller-facing result.
    pub(crate) fn finish(&self, outcome: ExecutionOutcome) -> ExecuteResult<ExecutionOutcome> {
        match outcome.status() {
            OutcomeStatus::Completed | OutcomeStatus::TimedOutWithOutput => {
                if outcome.status() == OutcomeStatus::TimedOutWithOutput {
                    tracing::info!(
                        "Process timed out but produced output (expected for interactive programs)"
                    );
                }
                Ok(outcome)
            }
            OutcomeStatus::TimedOutNoOutput => Err(ExecuteError::TimedOutNoOutput {
                secs: self.executor.timeout().as_secs(),
            }),
            OutcomeStatus::Failed => Err(ExecuteError::ExecutionFailed(outcome.failure_message())),
        }
    }
}

fn log_result(reference: &ProjectReference, result: &ExecuteResult<ExecutionOutcome>) {
    match result {
        Ok(outcome) => tracing::info!(
            "{} finished: {} (exit code {:?})",
            reference.identifier(),
            outcome.status(),
            outcome.exit_code()
        ),
        Err(e) => tracing::warn!("{} failed: {}", reference.identifier(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    use crate::util::process::find_executable;

    fn test_config(tmp: &Path) -> Config {
        let mut config = Config::default();
        config.paths.java_projects_dir = tmp.join("java");
        config.paths.python_projects_dir = tmp.join("python");
        config.paths.cache_dir = tmp.join("cache");
        config.paths.venv_dir = tmp.join("venvs");
        config.execution.timeout_secs = 5;
        config
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_unknown_project() {
        let tmp = TempDir::new().unwrap();
        let orch = Orchestrator::new(test_config(tmp.path()));

        let reference = ProjectReference::local(Ecosystem::Java, "nope").unwrap();
        let err = orch.execute(&reference, None).unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Project not found: nope");
    }

    #[test]
    fn test_adhoc_without_entry_point() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("java/demo/src/Main.java"), "class Main {}");
        let orch = Orchestrator::new(test_config(tmp.path()));

        let reference = ProjectReference::local(Ecosystem::Java, "demo").unwrap();
        let err = orch.execute(&reference, None).unwrap_err();
        assert!(matches!(err, ExecuteError::MissingEntryPoint(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_invalid_entry_point() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("java/demo")).unwrap();
        let orch = Orchestrator::new(test_config(tmp.path()));

        let reference = ProjectReference::local(Ecosystem::Java, "demo")
            .unwrap()
            .with_entry_point("a/b/Main");
        let err = orch.execute(&reference, None).unwrap_err();
        assert!(matches!(err, ExecuteError::InvalidRequest(_)));
    }

    #[test]
    fn test_finish_maps_silent_timeout() {
        let tmp = TempDir::new().unwrap();
        let mut config = test_config(tmp.path());
        config.execution.timeout_secs = 3;
        let orch = Orchestrator::new(config);
        assert_eq!(orch.executor.timeout(), Duration::from_secs(3));

        let err = orch
            .finish(ExecutionOutcome::timed_out(String::new(), String::new()))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::TimedOutNoOutput { secs: 3 }));

        let ok = orch
            .finish(ExecutionOutcome::completed(String::new(), "Traceback".into(), Some(1)))
            .unwrap();
        assert_eq!(ok.exit_code(), Some(1));
    }

    #[test]
    fn test_clean_removes_outputs() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join("java/demo/build/Main.class"), "");
        write(&tmp.path().join("java/demo/out/Main.class"), "");
        write(&tmp.path().join("java/demo/src/Main.java"), "");
        let orch = Orchestrator::new(test_config(tmp.path()));

        let reference = ProjectReference::local(Ecosystem::Java, "demo").unwrap();
        let removed = orch.clean(&reference, true).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(tmp.path().join("java/demo/src/Main.java").exists());
        assert!(!tmp.path().join("java/demo/build").exists());
    }

    #[test]
    fn test_adhoc_java_end_to_end() {
        if find_executable("javac").is_none() || find_executable("java").is_none() {
            eprintln!("skipping: JDK not found");
            return;
        }

        let tmp = TempDir::new().unwrap();
        write(
            &tmp.path().join("java/hello/src/app/Main.java"),
            "package app;\npublic class Main {\n  public static void main(String[] args) throws Exception {\n    java.io.BufferedReader r = new java.io.BufferedReader(new java.io.InputStreamReader(System.in));\n    System.out.println(\"Hello \" + r.readLine());\n  }\n}\n",
        );

        let mut config = test_config(tmp.path());
        config.execution.timeout_secs = 20;
        let orch = Orchestrator::new(config);

        let reference = ProjectReference::local(Ecosystem::Java, "hello")
            .unwrap()
            .with_entry_point("app.Main");
        let outcome = orch.execute(&reference, Some("world\n")).unwrap();

        assert_eq!(outcome.status(), OutcomeStatus::Completed);
        assert_eq!(outcome.output().trim(), "Hello world");
        assert_eq!(outcome.exit_code(), Some(0));
    }

    #[test]
    fn test_resource_lookup_recovers_via_source_classpath() {
        if find_executable("javac").is_none() || find_executable("java").is_none() {
            eprintln!("skipping: JDK not found");
            return;
        }

        let tmp = TempDir::new().unwrap();
        write(
            &tmp.path().join("java/maps/src/game/Main.java"),
            "package game;\npublic class Main {\n  public static void main(String[] args) throws Exception {\n    java.io.InputStream in = Main.class.getResourceAsStream(\"/map.txt\");\n    if (in == null) { System.err.println(\"map missing\"); System.exit(1); }\n    System.out.println(new String(in.readAllBytes()).trim());\n  }\n}\n",
        );
        write(&tmp.path().join("java/maps/src/map.txt"), "#..#\n");

        let mut config = test_config(tmp.path());
        config.execution.timeout_secs = 20;
        let orch = Orchestrator::new(config);

        let reference = ProjectReference::local(Ecosystem::Java, "maps")
            .unwrap()
            .with_entry_point("game.Main");
        let outcome = orch.execute(&reference, None).unwrap();

        assert_eq!(outcome.output().trim(), "#..#");
        assert_eq!(outcome.exit_code(), Some(0));
    }

    #[test]
    fn test_failed_fallbacks_surface_original_error() {
        if find_executable("javac").is_none() || find_executable("java").is_none() {
            eprintln!("skipping: JDK not found");
            return;
        }

        let tmp = TempDir::new().unwrap();
        write(
            &tmp.path().join("java/crash/src/Main.java"),
            "public class Main {\n  public static void main(String[] args) {\n    throw new IllegalStateException(\"original failure\");\n  }\n}\n",
        );

        let mut config = test_config(tmp.path());
        config.execution.timeout_secs = 20;
        let orch = Orchestrator::new(config);

        let reference = ProjectReference::local(Ecosystem::Java, "crash")
            .unwrap()
            .with_entry_point("Main");
        let outcome = orch.execute(&reference, None).unwrap();

        assert_eq!(outcome.status(), OutcomeStatus::Completed);
        assert_eq!(outcome.exit_code(), Some(1));
        assert!(outcome.output().contains("original failure"));
    }
}
