//! Project references - WHAT to run and WHERE it comes from.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ExecuteError, ExecuteResult};

/// Project identifiers double as directory names, so they are restricted to
/// a single safe path component.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

/// The language ecosystem a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Java,
    Python,
}

impl Ecosystem {
    /// All supported ecosystems.
    pub const ALL: [Ecosystem; 2] = [Ecosystem::Java, Ecosystem::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Java => "java",
            Ecosystem::Python => "python",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Ecosystem::Java),
            "python" | "py" => Ok(Ecosystem::Python),
            other => Err(format!("unknown ecosystem `{}` (expected java or python)", other)),
        }
    }
}

/// Where a project's source tree comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A directory under the configured projects directory
    Local,
    /// A git repository cloned into the project cache
    #[serde(alias = "github", alias = "git")]
    Remote,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Local => f.write_str("local"),
            SourceKind::Remote => f.write_str("remote"),
        }
    }
}

/// Immutable input to a single execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    identifier: String,
    ecosystem: Ecosystem,
    source: SourceKind,
    remote_url: Option<Url>,
    entry_point: Option<String>,
}

impl ProjectReference {
    /// A project living under the local projects directory.
    pub fn local(ecosystem: Ecosystem, identifier: impl Into<String>) -> ExecuteResult<Self> {
        let identifier = validate_identifier(identifier.into())?;
        Ok(ProjectReference {
            identifier,
            ecosystem,
            source: SourceKind::Local,
            remote_url: None,
            entry_point: None,
        })
    }

    /// A project fetched from a remote git repository.
    pub fn remote(
        ecosystem: Ecosystem,
        identifier: impl Into<String>,
        remote_url: &str,
    ) -> ExecuteResult<Self> {
        let identifier = validate_identifier(identifier.into())?;
        let url = parse_remote_url(remote_url)?;
        Ok(ProjectReference {
            identifier,
            ecosystem,
            source: SourceKind::Remote,
            remote_url: Some(url),
            entry_point: None,
        })
    }

    /// Set the explicit entry point.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        let entry_point = entry_point.into();
        self.entry_point = if entry_point.trim().is_empty() {
            None
        } else {
            Some(entry_point.trim().to_string())
        };
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn remote_url(&self) -> Option<&Url> {
        self.remote_url.as_ref()
    }

    /// The explicit entry point: a class name for Java, a file for Python.
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }
}

impl fmt::Display for ProjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.identifier, self.ecosystem, self.source)?;
        if let Some(url) = &self.remote_url {
            write!(f, " from {}", url)?;
        }
        Ok(())
    }
}

fn validate_identifier(identifier: String) -> ExecuteResult<String> {
    if IDENTIFIER_RE.is_match(&identifier) && identifier != "." && identifier != ".." {
        Ok(identifier)
    } else {
        Err(ExecuteError::invalid_request(format!(
            "invalid project id `{}`",
            identifier
        )))
    }
}

fn parse_remote_url(remote_url: &str) -> ExecuteResult<Url> {
    let url = Url::parse(remote_url).map_err(|e| {
        ExecuteError::invalid_request(format!("invalid repository URL `{}`: {}", remote_url, e))
    })?;

    match url.scheme() {
        "https" | "http" | "ssh" | "git" | "file" => Ok(url),
        other => Err(ExecuteError::invalid_request(format!(
            "unsupported repository URL scheme `{}`",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_reference() {
        let r = ProjectReference::local(Ecosystem::Java, "java-cli-1")
            .unwrap()
            .with_entry_point("a.b.Main");
        assert_eq!(r.identifier(), "java-cli-1");
        assert_eq!(r.source(), SourceKind::Local);
        assert_eq!(r.entry_point(), Some("a.b.Main"));
        assert!(r.remote_url().is_none());
    }

    #[test]
    fn test_remote_reference() {
        let r = ProjectReference::remote(
            Ecosystem::Java,
            "supermario",
            "https://github.com/user/supermario",
        )
        .unwrap();
        assert_eq!(r.source(), SourceKind::Remote);
        assert_eq!(r.remote_url().unwrap().host_str(), Some("github.com"));
    }

    #[test]
    fn test_rejects_path_traversal() {
        assert!(ProjectReference::local(Ecosystem::Java, "../etc").is_err());
        assert!(ProjectReference::local(Ecosystem::Java, "a/b").is_err());
        assert!(ProjectReference::local(Ecosystem::Java, "..").is_err());
        assert!(ProjectReference::local(Ecosystem::Java, "").is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = ProjectReference::remote(Ecosystem::Java, "x", "not a url").unwrap_err();
        assert!(matches!(err, ExecuteError::InvalidRequest(_)));

        let err = ProjectReference::remote(Ecosystem::Java, "x", "ftp://host/repo").unwrap_err();
        assert!(err.to_string().contains("scheme"));
    }

    #[test]
    fn test_blank_entry_point_is_none() {
        let r = ProjectReference::local(Ecosystem::Python, "py")
            .unwrap()
            .with_entry_point("  ");
        assert_eq!(r.entry_point(), None);
    }

    #[test]
    fn test_source_kind_aliases() {
        let kind: SourceKind = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(kind, SourceKind::Remote);
        let kind: SourceKind = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(kind, SourceKind::Local);
    }

    #[test]
    fn test_ecosystem_parse() {
        assert_eq!("Java".parse::<Ecosystem>().unwrap(), Ecosystem::Java);
        assert_eq!("py".parse::<Ecosystem>().unwrap(), Ecosystem::Python);
        assert!("ruby".parse::<Ecosystem>().is_err());
    }
}
