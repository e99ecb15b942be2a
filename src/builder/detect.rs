//! Build system detection from marker files.

use std::path::Path;

use crate::core::BuildKind;

/// Maven marker.
pub const MAVEN_MARKER: &str = "pom.xml";

/// Gradle markers, Groovy and Kotlin DSL.
pub const GRADLE_MARKERS: [&str; 2] = ["build.gradle", "build.gradle.kts"];

/// Check if a directory contains a Maven project.
pub fn is_maven_project(dir: &Path) -> bool {
    dir.join(MAVEN_MARKER).is_file()
}

/// Check if a directory contains a Gradle project.
pub fn is_gradle_project(dir: &Path) -> bool {
    GRADLE_MARKERS.iter().any(|m| dir.join(m).is_file())
}

/// Classify a project tree.
///
/// Only the root is inspected: markers in subdirectories (nested modules,
/// vendored samples) never change the result. Maven wins over Gradle when
/// both are present, and a tree without markers is always ad-hoc.
pub fn classify(root: &Path) -> BuildKind {
    let kind = if is_maven_project(root) {
        BuildKind::Maven
    } else if is_gradle_project(root) {
        BuildKind::Gradle
    } else {
        BuildKind::AdHoc
    };

    tracing::debug!("Detected {} project at {}", kind, root.display());
    kind
}
