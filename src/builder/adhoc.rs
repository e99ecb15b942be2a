//! Ad-hoc compilation of source trees without a build manifest.
//!
//! All `.java` files under the source root are handed to a single `javac`
//! invocation. Discovery order is not significant; the compiler resolves
//! references between the files itself.

use std::path::{Path, PathBuf};

use crate::core::{BuildResult, EntryPoint};
use crate::error::{ExecuteError, ExecuteResult};
use crate::util::fs::{find_files_with_extension, fresh_dir, relative_path};
use crate::util::process::{resolve_tool, ProcessBuilder};

/// Directory sources are discovered under: `src/` if present, else the root.
pub fn source_root(root: &Path) -> PathBuf {
    let src = root.join("src");
    if src.is_dir() {
        src
    } else {
        root.to_path_buf()
    }
}

/// Check that an entry point was given and that its source file exists.
///
/// Runs before the compiler is ever invoked.
pub fn require_entry_point<'a>(
    root: &Path,
    entry_point: Option<&'a EntryPoint>,
) -> ExecuteResult<&'a EntryPoint> {
    let entry_point = entry_point.ok_or_else(|| {
        ExecuteError::MissingEntryPoint("Main class not specified for Java project".to_string())
    })?;

    let source = entry_point.source_file(&source_root(root));
    if !source.is_file() {
        return Err(ExecuteError::MissingEntryPoint(format!(
            "Main class file not found: {}",
            relative_path(root, &source).display()
        )));
    }

    Ok(entry_point)
}

/// Compiler for ad-hoc source trees.
#[derive(Debug, Clone)]
pub struct AdHocCompiler {
    javac: PathBuf,
}

impl AdHocCompiler {
    /// Create a compiler using the configured `javac`.
    pub fn new(javac: &str) -> Self {
        AdHocCompiler {
            javac: resolve_tool(javac),
        }
    }

    /// Compile the tree into `root/<output_dir>`.
    pub fn compile(
        &self,
        root: &Path,
        entry_point: Option<&EntryPoint>,
        output_dir: &str,
    ) -> ExecuteResult<BuildResult> {
        let entry_point = require_entry_point(root, entry_point)?;

        tracing::info!("Compiling Java project...");
        let sources = find_files_with_extension(&source_root(root), "java");
        tracing::debug!("Found {} Java files to compile", sources.len());

        self.compile_sources(root, output_dir, &sources, entry_point)
    }

    /// Compile an explicit list of sources, then check that the entry
    /// point's class file was produced.
    pub fn compile_sources(
        &self,
        root: &Path,
        output_dir: &str,
        sources: &[PathBuf],
        entry_point: &EntryPoint,
    ) -> ExecuteResult<BuildResult> {
        if sources.is_empty() {
            return Err(ExecuteError::Compile {
                message: "no Java sources found".to_string(),
            });
        }

        let out = root.join(output_dir);
        fresh_dir(&out)?;

        let cmd = ProcessBuilder::new(&self.javac)
            .arg("-d")
            .arg(output_dir)
            .args(sources.iter().map(|s| relative_path(root, s)))
            .cwd(root);

        tracing::debug!("Running: {}", cmd.display_command());
        let output = cmd.exec().map_err(|e| ExecuteError::ProcessSpawn {
            program: self.javac.display().to_string(),
            message: format!("{:#}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).into_owned()
            } else {
                stderr.into_owned()
            };
            return Err(ExecuteError::Compile { message });
        }

        let class_file = entry_point.class_file(&out);
        if !class_file.is_file() {
            tracing::warn!("Compiled class file not found: {}", class_file.display());
            return Err(ExecuteError::Compile {
                message: format!(
                    "compiled class file not found: {}",
                    relative_path(root, &class_file).display()
                ),
            });
        }

        tracing::info!("Compilation successful");
        Ok(BuildResult::CompiledTree {
            output_dir: out,
            entry_point: Some(entry_point.clone()),
        })
    }
}
