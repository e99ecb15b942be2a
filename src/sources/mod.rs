//! Project sources.
//!
//! Sources are responsible for producing a local project tree from a
//! reference (a local directory or a remote git repository).

pub mod git;
pub mod lock;
pub mod resolver;
pub mod source;

pub use git::GitFetcher;
pub use lock::KeyedLocks;
pub use resolver::SourceResolver;
pub use source::RepositoryFetcher;
