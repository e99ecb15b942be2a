//! Fetcher trait - the repository service the resolver depends on.

use std::path::Path;

use anyhow::Result;
use url::Url;

/// Fetches and refreshes local working copies of remote repositories.
pub trait RepositoryFetcher: Send + Sync {
    /// Get the fetcher name for display.
    fn name(&self) -> &str;

    /// Create a working copy of `remote` at `target` (which does not exist yet).
    fn ensure_local(&self, remote: &Url, target: &Path) -> Result<()>;

    /// Bring an existing working copy up to date with its remote.
    fn refresh(&self, target: &Path) -> Result<()>;
}
