//! Declarative build tools (Maven and Gradle).
//!
//! A failed declarative build is terminal: the project's own build script
//! is authoritative, so nothing here retries with other conventions.

use std::path::{Path, PathBuf};

use crate::builder::locate::find_bundle;
use crate::core::{BuildKind, BuildResult, EntryPoint};
use crate::error::{ExecuteError, ExecuteResult};
use crate::util::config::JavaConfig;
use crate::util::process::{resolve_tool, ProcessBuilder};

/// Gradle wrapper script name for this platform.
fn gradle_wrapper(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("gradlew.bat")
    } else {
        root.join("gradlew")
    }
}

/// Build the "compile, skip tests" command for a declarative project.
///
/// Returns `None` for ad-hoc trees, which have no build tool.
pub fn build_command(root: &Path, kind: BuildKind, config: &JavaConfig) -> Option<ProcessBuilder> {
    let cmd = match kind {
        BuildKind::Maven => {
            ProcessBuilder::new(resolve_tool(&config.mvn)).args(["clean", "package", "-DskipTests"])
        }
        BuildKind::Gradle => {
            let wrapper = gradle_wrapper(root);
            let program = if wrapper.is_file() {
                wrapper
            } else {
                resolve_tool(&config.gradle)
            };
            ProcessBuilder::new(program).args(["build", "-x", "test"])
        }
        BuildKind::AdHoc => return None,
    };

    Some(cmd.cwd(root))
}

/// Run the project's build tool and describe what it produced.
///
/// A packaged bundle in the tool's conventional location wins; otherwise the
/// compiled classes directory is paired with the explicit entry point.
pub fn build(
    root: &Path,
    kind: BuildKind,
    entry_point: Option<&EntryPoint>,
    config: &JavaConfig,
) -> ExecuteResult<BuildResult> {
    let Some(cmd) = build_command(root, kind, config) else {
        return Err(anyhow::anyhow!("{} projects have no build tool", kind).into());
    };

    tracing::info!("Detected {} project, building...", kind);
    tracing::debug!("Running: {}", cmd.display_command());

    let output = cmd.exec().map_err(|e| ExecuteError::ProcessSpawn {
        program: cmd.get_program().display().to_string(),
        message: format!("{:#}", e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Maven reports compile errors on stdout.
        let detail = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };
        return Err(ExecuteError::Build {
            tool: kind.to_string(),
            code: output.status.code(),
            stderr: detail,
        });
    }

    tracing::info!("Build successful");

    if let Some(artifact) = find_bundle(root, kind)? {
        tracing::debug!("Found bundle {}", artifact.display());
        return Ok(BuildResult::PackagedBundle { artifact });
    }

    let classes = kind.classes_dir().unwrap_or("classes");
    Ok(BuildResult::CompiledTree {
        output_dir: root.join(classes),
        entry_point: entry_point.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_maven_command() {
        let tmp = TempDir::new().unwrap();
        let config = JavaConfig {
            mvn: "definitely-not-mvn".into(),
            ..Default::default()
        };

        let cmd = build_command(tmp.path(), BuildKind::Maven, &config).unwrap();
        assert_eq!(
            cmd.display_command(),
            "definitely-not-mvn clean package -DskipTests"
        );
        assert_eq!(cmd.get_cwd(), Some(tmp.path()));
    }

    #[test]
    fn test_gradle_prefers_wrapper() {
        let tmp = TempDir::new().unwrap();
        let config = JavaConfig {
            gradle: "definitely-not-gradle".into(),
            ..Default::default()
        };

        let cmd = build_command(tmp.path(), BuildKind::Gradle, &config).unwrap();
        assert_eq!(cmd.get_program(), Path::new("definitely-not-gradle"));
        assert_eq!(cmd.get_args(), ["build", "-x", "test"]);

        fs::write(gradle_wrapper(tmp.path()), "#!/bin/sh\n").unwrap();
        let cmd = build_command(tmp.path(), BuildKind::Gradle, &config).unwrap();
        assert_eq!(cmd.get_program(), gradle_wrapper(tmp.path()));
    }

    #[test]
    fn test_adhoc_has_no_command() {
        let tmp = TempDir::new().unwrap();
        assert!(build_command(tmp.path(), BuildKind::AdHoc, &JavaConfig::default()).is_none());
    }

    #[test]
    fn test_missing_tool_is_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let config = JavaConfig {
            mvn: "definitely-not-mvn".into(),
            ..Default::default()
        };

        let err = build(tmp.path(), BuildKind::Maven, None, &config).unwrap_err();
        assert!(matches!(err, ExecuteError::ProcessSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_is_terminal_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let wrapper = gradle_wrapper(tmp.path());
        fs::write(&wrapper, "#!/bin/sh\necho 'compilation failed' >&2\nexit 3\n").unwrap();
        fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755)).unwrap();

        let err = build(tmp.path(), BuildKind::Gradle, None, &JavaConfig::default()).unwrap_err();
        match err {
            ExecuteError::Build { tool, code, stderr } => {
                assert_eq!(tool, "gradle");
                assert_eq!(code, Some(3));
                assert!(stderr.contains("compilation failed"));
            }
            other => panic!("expected build error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_build_reports_bundle() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let wrapper = gradle_wrapper(tmp.path());
        fs::write(
            &wrapper,
            "#!/bin/sh\nmkdir -p build/libs\ntouch build/libs/app.jar\n",
        )
        .unwrap();
        fs::set_permissions(&wrapper, fs::Permissions::from_mode(0o755)).unwrap();

        let ep: EntryPoint = "a.b.Main".parse().unwrap();
        let result = build(tmp.path(), BuildKind::Gradle, Some(&ep), &JavaConfig::default()).unwrap();
        assert_eq!(
            result,
            BuildResult::PackagedBundle {
                artifact: tmp.path().join("build/libs/app.jar")
            }
        );
    }
}
