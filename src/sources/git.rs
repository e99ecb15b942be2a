//! Git fetcher - working copies of remote projects via libgit2.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{FetchOptions, Repository, ResetType};
use url::Url;

use crate::sources::RepositoryFetcher;
use crate::util::fs::ensure_dir;

/// Clones on first use and pulls (fetch + hard reset to upstream) afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        GitFetcher
    }
}

impl RepositoryFetcher for GitFetcher {
    fn name(&self) -> &str {
        "git"
    }

    fn ensure_local(&self, remote: &Url, target: &Path) -> Result<()> {
        tracing::info!("Cloning {} into {}", remote, target.display());

        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }

        Repository::clone(remote.as_str(), target)
            .with_context(|| format!("failed to clone {}", remote))?;

        Ok(())
    }

    fn refresh(&self, target: &Path) -> Result<()> {
        tracing::info!("Updating {}", target.display());

        let repo = Repository::open(target)
            .with_context(|| format!("not a git repository: {}", target.display()))?;

        let mut remote = repo
            .find_remote("origin")
            .context("working copy has no `origin` remote")?;
        let mut opts = FetchOptions::new();
        remote
            .fetch(
                &["+refs/heads/*:refs/remotes/origin/*"],
                Some(&mut opts),
                None,
            )
            .with_context(|| {
                format!("failed to fetch from {}", remote.url().unwrap_or("origin"))
            })?;

        let head = repo.head().context("failed to read HEAD")?;
        if !head.is_branch() {
            tracing::debug!("HEAD is detached, leaving working copy as is");
            return Ok(());
        }

        let Some(branch) = head.shorthand() else {
            return Ok(());
        };
        let upstream = format!("refs/remotes/origin/{}", branch);
        let commit = repo
            .find_reference(&upstream)
            .and_then(|r| r.peel_to_commit())
            .with_context(|| format!("no upstream `{}`", upstream))?;

        tracing::debug!("Resetting {} to {}", branch, commit.id());
        repo.reset(commit.as_object(), ResetType::Hard, None)
            .context("failed to update working copy")?;

        Ok(())
    }
}
