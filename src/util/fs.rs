//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Replace a directory with an empty one.
pub fn fresh_dir(path: &Path) -> Result<()> {
    remove_dir_all_if_exists(path)?;
    ensure_dir(path)
}

/// Recursively collect files with the given extension, in traversal order.
pub fn find_files_with_extension(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("walk error: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == extension))
        .map(|entry| entry.into_path())
        .collect()
}

/// Find files matching a glob pattern relative to a base directory.
///
/// Results are sorted so that callers picking "the first match" are
/// deterministic.
pub fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = base.join(pattern);
    let pattern_str = full_pattern.to_string_lossy();

    let mut results = Vec::new();
    for entry in glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_files_with_extension() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("src/a/b");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("Main.java"), "class Main {}").unwrap();
        fs::write(tmp.path().join("src/Util.java"), "class Util {}").unwrap();
        fs::write(tmp.path().join("src/readme.txt"), "readme").unwrap();

        let files = find_files_with_extension(&tmp.path().join("src"), "java");
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "java"));
    }

    #[test]
    fn test_glob_files_sorted() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("zeta.jar"), "").unwrap();
        fs::write(target.join("alpha.jar"), "").unwrap();

        let jars = glob_files(tmp.path(), "target/*.jar").unwrap();
        assert_eq!(jars.len(), 2);
        assert!(jars[0].ends_with("alpha.jar"));
    }

    #[test]
    fn test_fresh_dir_clears_contents() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("build");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("Stale.class"), "").unwrap();

        fresh_dir(&out).unwrap();

        assert!(out.exists());
        assert!(!out.join("Stale.class").exists());
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/p"), Path::new("/p/src/Main.java"));
        assert_eq!(rel, PathBuf::from("src/Main.java"));
    }
}
