//! Artifact location - choosing what to launch after a build.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{BuildKind, BuildResult, EntryPoint};
use crate::error::{ExecuteError, ExecuteResult};
use crate::util::fs::glob_files;
use crate::util::process::{join_classpath, ProcessBuilder};

/// Jar suffixes that are never runnable.
const NON_RUNNABLE_SUFFIXES: [&str; 2] = ["-sources.jar", "-javadoc.jar"];

/// Find a packaged bundle in the tool's conventional output location.
///
/// When several jars are present the lexicographically first is used.
pub fn find_bundle(root: &Path, kind: BuildKind) -> Result<Option<PathBuf>> {
    let Some(pattern) = kind.bundle_pattern() else {
        return Ok(None);
    };

    let jar = glob_files(root, pattern)?.into_iter().find(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        !NON_RUNNABLE_SUFFIXES.iter().any(|s| name.ends_with(s))
    });

    Ok(jar)
}

/// The thing that gets launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnableUnit {
    /// A self-describing jar, run with `java -jar`
    Bundle { jar: PathBuf },
    /// A main class run against an explicit classpath
    EntryPoint {
        classpath: Vec<PathBuf>,
        entry_point: EntryPoint,
    },
}

impl RunnableUnit {
    /// The launcher command, run from the project root.
    pub fn command(&self, java: impl AsRef<Path>, root: &Path) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(java).cwd(root);
        match self {
            RunnableUnit::Bundle { jar } => cmd.arg("-jar").arg(jar),
            RunnableUnit::EntryPoint {
                classpath,
                entry_point,
            } => cmd
                .arg("-cp")
                .arg(join_classpath(classpath))
                .arg(entry_point.as_str()),
        }
    }

    /// Extend the classpath of an entry-point unit.
    pub fn with_classpath_entry(self, entry: PathBuf) -> Self {
        match self {
            RunnableUnit::EntryPoint {
                mut classpath,
                entry_point,
            } => {
                classpath.push(entry);
                RunnableUnit::EntryPoint {
                    classpath,
                    entry_point,
                }
            }
            bundle => bundle,
        }
    }
}

/// Pick the runnable unit for a build.
///
/// A bundle always wins over an explicit entry point, since it carries its
/// own manifest and classpath.
pub fn locate(
    root: &Path,
    kind: BuildKind,
    result: &BuildResult,
    explicit: Option<&EntryPoint>,
) -> ExecuteResult<RunnableUnit> {
    let (output_dir, built_entry) = match result {
        BuildResult::PackagedBundle { artifact } => {
            return Ok(RunnableUnit::Bundle {
                jar: artifact.clone(),
            });
        }
        BuildResult::CompiledTree {
            output_dir,
            entry_point,
        } => (output_dir, entry_point.as_ref()),
    };

    if let Some(jar) = find_bundle(root, kind).map_err(ExecuteError::from)? {
        tracing::debug!("Preferring bundle {} over entry point", jar.display());
        return Ok(RunnableUnit::Bundle { jar });
    }

    match explicit.or(built_entry) {
        Some(entry_point) => Ok(RunnableUnit::EntryPoint {
            classpath: vec![output_dir.clone()],
            entry_point: entry_point.clone(),
        }),
        None => Err(ExecuteError::NotRunnable),
    }
}
