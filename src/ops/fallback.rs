//! Fallback strategies for ad-hoc Java projects.
//!
//! When the primary compile-and-run attempt fails hard, the strategies are
//! tried in declaration order and the first attempt that does not fail is
//! returned unchanged.

use std::path::{Path, PathBuf};

use crate::builder::adhoc::{source_root, AdHocCompiler};
use crate::builder::RunnableUnit;
use crate::core::{EntryPoint, ExecutionOutcome, OutcomeStatus};
use crate::runner::BoundedExecutor;
use crate::sources::KeyedLocks;
use crate::util::config::JavaConfig;
use crate::util::fs::find_files_with_extension;
use crate::util::process::resolve_tool;

/// Everything a strategy may use to retry a project.
pub struct FallbackContext<'a> {
    /// Project identifier, used to re-acquire the build lock
    pub project_id: &'a str,
    /// Project root
    pub root: &'a Path,
    /// The entry point the primary attempt ran
    pub entry_point: &'a EntryPoint,
    /// Output directory of the primary compile
    pub build_output: PathBuf,
    pub config: &'a JavaConfig,
    pub executor: &'a BoundedExecutor,
    pub locks: &'a KeyedLocks,
    pub stdin: Option<&'a str>,
}

impl FallbackContext<'_> {
    fn run(&self, unit: RunnableUnit) -> ExecutionOutcome {
        let cmd = unit.command(resolve_tool(&self.config.java), self.root);
        self.executor.execute(&cmd, self.stdin)
    }
}

/// Result of a single strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyResult {
    Outcome(ExecutionOutcome),
    NotApplicable,
}

/// A named way of retrying a failed ad-hoc run.
pub trait FallbackStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn attempt(&self, ctx: &FallbackContext<'_>) -> StrategyResult;
}

/// Whether an ad-hoc attempt counts as failed.
///
/// Silent timeouts are not failures here: a hung program is not retried.
pub fn is_failed_attempt(outcome: &ExecutionOutcome) -> bool {
    outcome.status() == OutcomeStatus::Failed || outcome.exited_with_error()
}

/// Recompile into the alternate output directory and run the fallback
/// entry point used by the game project template.
#[derive(Debug, Default)]
pub struct AlternateOutputDir;

impl FallbackStrategy for AlternateOutputDir {
    fn name(&self) -> &str {
        "alternate-output-dir"
    }

    fn attempt(&self, ctx: &FallbackContext<'_>) -> StrategyResult {
        let Ok(entry_point) = ctx.config.fallback_entry_point.parse::<EntryPoint>() else {
            return StrategyResult::NotApplicable;
        };

        let src = source_root(ctx.root);
        if !entry_point.source_file(&src).is_file() {
            return StrategyResult::NotApplicable;
        }

        let out = &ctx.config.fallback_output_dir;
        tracing::info!("Recompiling with {} directory...", out);

        let compiled = ctx.locks.with_lock(ctx.project_id, || {
            let sources = find_files_with_extension(&src, "java");
            AdHocCompiler::new(&ctx.config.javac).compile_sources(
                ctx.root,
                out,
                &sources,
                &entry_point,
            )
        });
        if let Err(e) = compiled {
            return StrategyResult::Outcome(ExecutionOutcome::failed(e.to_string()));
        }

        StrategyResult::Outcome(ctx.run(RunnableUnit::EntryPoint {
            classpath: vec![ctx.root.join(out)],
            entry_point,
        }))
    }
}

/// Re-run the original entry point with the source root on the classpath,
/// for programs that load resources relative to their sources.
#[derive(Debug, Default)]
pub struct SourceOnClasspath;

impl FallbackStrategy for SourceOnClasspath {
    fn name(&self) -> &str {
        "source-on-classpath"
    }

    fn attempt(&self, ctx: &FallbackContext<'_>) -> StrategyResult {
        if !ctx.entry_point.class_file(&ctx.build_output).is_file() {
            return StrategyResult::NotApplicable;
        }

        tracing::info!("Trying with src directory in classpath...");
        let unit = RunnableUnit::EntryPoint {
            classpath: vec![ctx.build_output.clone()],
            entry_point: ctx.entry_point.clone(),
        };
        StrategyResult::Outcome(ctx.run(unit.with_classpath_entry(source_root(ctx.root))))
    }
}

/// An ordered list of strategies.
pub struct FallbackSequencer {
    strategies: Vec<Box<dyn FallbackStrategy>>,
}

impl Default for FallbackSequencer {
    fn default() -> Self {
        FallbackSequencer::new(vec![
            Box::new(AlternateOutputDir),
            Box::new(SourceOnClasspath),
        ])
    }
}

impl FallbackSequencer {
    pub fn new(strategies: Vec<Box<dyn FallbackStrategy>>) -> Self {
        FallbackSequencer { strategies }
    }

    /// Strategy names, in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Try each strategy until one does not fail.
    ///
    /// Returns `None` when every strategy failed or did not apply; the
    /// caller then reports its own original error.
    pub fn run(&self, ctx: &FallbackContext<'_>) -> Option<ExecutionOutcome> {
        for strategy in &self.strategies {
            match strategy.attempt(ctx) {
                StrategyResult::NotApplicable => {
                    tracing::debug!("Fallback `{}` not applicable", strategy.name());
                }
                StrategyResult::Outcome(outcome) if is_failed_attempt(&outcome) => {
                    tracing::warn!(
                        "Fallback `{}` failed: {}",
                        strategy.name(),
                        outcome.failure_message()
                    );
                }
                StrategyResult::Outcome(outcome) => {
                    tracing::info!("Fallback `{}` succeeded", strategy.name());
                    return Some(outcome);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct Scripted {
        name: &'static str,
        result: StrategyResult,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FallbackStrategy for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn attempt(&self, _ctx: &FallbackContext<'_>) -> StrategyResult {
            self.log.lock().unwrap().push(self.name);
            self.result.clone()
        }
    }

    struct Fixture {
        tmp: TempDir,
        entry_point: EntryPoint,
        config: JavaConfig,
        executor: BoundedExecutor,
        locks: KeyedLocks,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                tmp: TempDir::new().unwrap(),
                entry_point: "a.b.Main".parse().unwrap(),
                config: JavaConfig {
                    javac: "definitely-not-javac".into(),
                    java: "definitely-not-java".into(),
                    ..Default::default()
                },
                executor: BoundedExecutor::default(),
                locks: KeyedLocks::new(),
            }
        }

        fn ctx(&self) -> FallbackContext<'_> {
            FallbackContext {
                project_id: "demo",
                root: self.tmp.path(),
                entry_point: &self.entry_point,
                build_output: self.tmp.path().join("build"),
                config: &self.config,
                executor: &self.executor,
                locks: &self.locks,
                stdin: None,
            }
        }
    }

    fn scripted(
        name: &'static str,
        result: StrategyResult,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Box<dyn FallbackStrategy> {
        Box::new(Scripted {
            name,
            result,
            log: log.clone(),
        })
    }

    #[test]
    fn test_default_order() {
        let names = FallbackSequencer::default().names().join(",");
        assert_eq!(names, "alternate-output-dir,source-on-classpath");
    }

    #[test]
    fn test_stops_at_first_success() {
        let fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let winner = ExecutionOutcome::timed_out("Welcome\n".into(), String::new());

        let sequencer = FallbackSequencer::new(vec![
            scripted("first", StrategyResult::Outcome(winner.clone()), &log),
            scripted(
                "second",
                StrategyResult::Outcome(ExecutionOutcome::completed("no".into(), String::new(), Some(0))),
                &log,
            ),
        ]);

        assert_eq!(sequencer.run(&fixture.ctx()), Some(winner));
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_skips_failures_and_inapplicable() {
        let fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let ok = ExecutionOutcome::completed("ok".into(), String::new(), Some(0));

        let sequencer = FallbackSequencer::new(vec![
            scripted("na", StrategyResult::NotApplicable, &log),
            scripted(
                "nonzero",
                StrategyResult::Outcome(ExecutionOutcome::completed(
                    String::new(),
                    "Exception".into(),
                    Some(1),
                )),
                &log,
            ),
            scripted("spawn", StrategyResult::Outcome(ExecutionOutcome::failed("no java")), &log),
            scripted("ok", StrategyResult::Outcome(ok.clone()), &log),
        ]);

        assert_eq!(sequencer.run(&fixture.ctx()), Some(ok));
        assert_eq!(*log.lock().unwrap(), vec!["na", "nonzero", "spawn", "ok"]);
    }

    #[test]
    fn test_all_failed_returns_none() {
        let fixture = Fixture::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sequencer = FallbackSequencer::new(vec![
            scripted("a", StrategyResult::Outcome(ExecutionOutcome::failed("boom")), &log),
            scripted("b", StrategyResult::NotApplicable, &log),
        ]);

        assert_eq!(sequencer.run(&fixture.ctx()), None);
    }

    #[test]
    fn test_silent_timeout_is_not_a_failed_attempt() {
        let silent = ExecutionOutcome::timed_out(String::new(), String::new());
        assert!(!is_failed_attempt(&silent));
        assert!(is_failed_attempt(&ExecutionOutcome::failed("x")));
    }

    #[test]
    fn test_alternate_output_dir_requires_template_entry() {
        let fixture = Fixture::new();
        assert_eq!(
            AlternateOutputDir.attempt(&fixture.ctx()),
            StrategyResult::NotApplicable
        );
    }

    #[test]
    fn test_alternate_output_dir_reports_compile_failure() {
        let fixture = Fixture::new();
        let src = fixture
            .tmp
            .path()
            .join("src/edu/monash/fit2099/game/Application.java");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "package edu.monash.fit2099.game; class Application {}").unwrap();

        match AlternateOutputDir.attempt(&fixture.ctx()) {
            StrategyResult::Outcome(outcome) => {
                assert_eq!(outcome.status(), OutcomeStatus::Failed);
                assert!(outcome.cause().unwrap().contains("definitely-not-javac"));
            }
            other => panic!("expected an outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_source_on_classpath_needs_compiled_entry() {
        let fixture = Fixture::new();
        assert_eq!(
            SourceOnClasspath.attempt(&fixture.ctx()),
            StrategyResult::NotApplicable
        );

        let class = fixture.tmp.path().join("build/a/b/Main.class");
        fs::create_dir_all(class.parent().unwrap()).unwrap();
        fs::write(&class, "").unwrap();

        match SourceOnClasspath.attempt(&fixture.ctx()) {
            StrategyResult::Outcome(outcome) => {
                // The launcher does not exist, so the run itself fails.
                assert_eq!(outcome.status(), OutcomeStatus::Failed);
            }
            other => panic!("expected an outcome, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_source_on_classpath_adds_source_root() {
        use std::os::unix::fs::PermissionsExt;

        let mut fixture = Fixture::new();
        let launcher = fixture.tmp.path().join("fake-java");
        fs::write(&launcher, "#!/bin/sh\necho \"$2 $3\"\n").unwrap();
        fs::set_permissions(&launcher, fs::Permissions::from_mode(0o755)).unwrap();
        fixture.config.java = launcher.to_string_lossy().into_owned();

        let class = fixture.tmp.path().join("build/a/b/Main.class");
        fs::create_dir_all(class.parent().unwrap()).unwrap();
        fs::write(&class, "").unwrap();

        let root = fixture.tmp.path();
        let expected = format!(
            "{}:{} a.b.Main",
            root.join("build").display(),
            root.display()
        );
        match SourceOnClasspath.attempt(&fixture.ctx()) {
            StrategyResult::Outcome(outcome) => {
                assert_eq!(outcome.status(), OutcomeStatus::Completed);
                assert_eq!(outcome.output().trim(), expected);
            }
            other => panic!("expected an outcome, got {other:?}"),
        }
    }
}
