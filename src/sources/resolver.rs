//! Source resolution - turning a project reference into a directory.

use std::path::{Path, PathBuf};

use crate::core::{Ecosystem, ProjectReference, SourceKind};
use crate::error::{ExecuteError, ExecuteResult};
use crate::sources::RepositoryFetcher;
use crate::util::config::PathsConfig;

/// Resolves project references to ready-to-build trees.
///
/// Remote projects are kept as working copies under the cache directory,
/// keyed by project identifier. The resolver mutates that shared cache;
/// callers serialize resolution per identifier.
pub struct SourceResolver {
    java_dir: PathBuf,
    python_dir: PathBuf,
    cache_dir: PathBuf,
    fetcher: Box<dyn RepositoryFetcher>,
}

impl SourceResolver {
    /// Create a resolver over the configured directories.
    pub fn new(paths: &PathsConfig, fetcher: Box<dyn RepositoryFetcher>) -> Self {
        SourceResolver {
            java_dir: paths.java_projects_dir.clone(),
            python_dir: paths.python_projects_dir.clone(),
            cache_dir: paths.cache_dir.clone(),
            fetcher,
        }
    }

    /// Base directory for local projects of an ecosystem.
    pub fn local_base(&self, ecosystem: Ecosystem) -> &Path {
        match ecosystem {
            Ecosystem::Java => &self.java_dir,
            Ecosystem::Python => &self.python_dir,
        }
    }

    /// Directory a reference resolves to, without touching the filesystem.
    pub fn target_path(&self, reference: &ProjectReference) -> PathBuf {
        match reference.source() {
            SourceKind::Local => self
                .local_base(reference.ecosystem())
                .join(reference.identifier()),
            SourceKind::Remote => self.cache_dir.join(reference.identifier()),
        }
    }

    /// Resolve a reference to a project root.
    pub fn resolve(&self, reference: &ProjectReference) -> ExecuteResult<PathBuf> {
        let target = self.target_path(reference);

        match reference.source() {
            SourceKind::Local => {
                if !target.is_dir() {
                    return Err(ExecuteError::project_not_found(reference.identifier()));
                }
            }
            SourceKind::Remote => {
                let url = reference.remote_url().ok_or_else(|| {
                    ExecuteError::invalid_request("remote project without a repository URL")
                })?;

                let result = if target.exists() {
                    tracing::debug!("Working copy exists, refreshing {}", target.display());
                    self.fetcher.refresh(&target)
                } else {
                    tracing::debug!("No working copy, fetching {}", url);
                    self.fetcher.ensure_local(url, &target)
                };

                result.map_err(|e| ExecuteError::Fetch {
                    url: url.to_string(),
                    message: format!("{:#}", e),
                })?;
            }
        }

        tracing::info!("Using project path: {}", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use anyhow::{bail, Result};
    use tempfile::TempDir;
    use url::Url;

    #[derive(Default, Clone)]
    struct RecordingFetcher {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl RepositoryFetcher for RecordingFetcher {
        fn name(&self) -> &str {
            "recording"
        }

        fn ensure_local(&self, remote: &Url, target: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(format!("clone {}", remote));
            if self.fail {
                bail!("authentication required");
            }
            std::fs::create_dir_all(target)?;
            Ok(())
        }

        fn refresh(&self, target: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("pull {}", target.file_name().unwrap().to_string_lossy()));
            Ok(())
        }
    }

    fn paths(tmp: &TempDir) -> PathsConfig {
        PathsConfig {
            java_projects_dir: tmp.path().join("java"),
            python_projects_dir: tmp.path().join("python"),
            cache_dir: tmp.path().join("cache"),
            venv_dir: tmp.path().join("venvs"),
            catalog: tmp.path().join("projects.toml"),
        }
    }

    #[test]
    fn test_local_resolution() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("java/demo")).unwrap();
        let resolver = SourceResolver::new(&paths(&tmp), Box::new(RecordingFetcher::default()));

        let reference = ProjectReference::local(Ecosystem::Java, "demo").unwrap();
        assert_eq!(resolver.resolve(&reference).unwrap(), tmp.path().join("java/demo"));

        let reference = ProjectReference::local(Ecosystem::Python, "demo").unwrap();
        let err = resolver.resolve(&reference).unwrap_err();
        assert!(matches!(err, ExecuteError::NotFound { .. }));
    }

    #[test]
    fn test_remote_clones_then_refreshes() {
        let tmp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::default();
        let calls = fetcher.calls.clone();
        let resolver = SourceResolver::new(&paths(&tmp), Box::new(fetcher));

        let reference =
            ProjectReference::remote(Ecosystem::Java, "mario", "https://example.com/mario.git")
                .unwrap();

        let first = resolver.resolve(&reference).unwrap();
        let second = resolver.resolve(&reference).unwrap();

        assert_eq!(first, tmp.path().join("cache/mario"));
        assert_eq!(first, second);
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "clone https://example.com/mario.git".to_string(),
                "pull mario".to_string()
            ]
        );
    }

    #[test]
    fn test_remote_fetch_failure() {
        let tmp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher {
            fail: true,
            ..Default::default()
        };
        let resolver = SourceResolver::new(&paths(&tmp), Box::new(fetcher));

        let reference =
            ProjectReference::remote(Ecosystem::Java, "private", "https://example.com/p.git")
                .unwrap();
        let err = resolver.resolve(&reference).unwrap_err();

        match err {
            ExecuteError::Fetch { url, message } => {
                assert_eq!(url, "https://example.com/p.git");
                assert!(message.contains("authentication required"));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
