//! Build classification and build results.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::entry_point::EntryPoint;

/// How a project tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    /// Maven (`pom.xml`)
    Maven,
    /// Gradle (`build.gradle` / `build.gradle.kts`)
    Gradle,
    /// No manifest; sources are compiled directly
    AdHoc,
}

impl BuildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildKind::Maven => "maven",
            BuildKind::Gradle => "gradle",
            BuildKind::AdHoc => "adhoc",
        }
    }

    /// Whether a manifest-driven build tool owns this project.
    pub fn is_declarative(&self) -> bool {
        !matches!(self, BuildKind::AdHoc)
    }

    /// Glob (relative to the project root) where the tool puts packaged jars.
    pub fn bundle_pattern(&self) -> Option<&'static str> {
        match self {
            BuildKind::Maven => Some("target/*.jar"),
            BuildKind::Gradle => Some("build/libs/*.jar"),
            BuildKind::AdHoc => None,
        }
    }

    /// Directory (relative to the project root) holding compiled classes.
    pub fn classes_dir(&self) -> Option<&'static str> {
        match self {
            BuildKind::Maven => Some("target/classes"),
            BuildKind::Gradle => Some("build/classes/java/main"),
            BuildKind::AdHoc => None,
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project tree that has been located and classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    pub root: PathBuf,
    pub kind: BuildKind,
}

impl ResolvedProject {
    pub fn new(root: PathBuf, kind: BuildKind) -> Self {
        ResolvedProject { root, kind }
    }
}

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    /// A single directly-runnable jar
    PackagedBundle { artifact: PathBuf },
    /// A directory of compiled classes, runnable through an entry point
    CompiledTree {
        output_dir: PathBuf,
        entry_point: Option<EntryPoint>,
    },
}

impl BuildResult {
    /// Location of the artifact or output directory.
    pub fn path(&self) -> &Path {
        match self {
            BuildResult::PackagedBundle { artifact } => artifact,
            BuildResult::CompiledTree { output_dir, .. } => output_dir,
        }
    }
}
