//! Project catalog - static metadata for the projects a site exposes.
//!
//! The catalog is a TOML file:
//!
//! ```toml
//! [[project]]
//! id = "java-cli-1"
//! name = "Java CLI Project"
//! ecosystem = "java"
//! kind = "cli"
//! source = "remote"
//! remote_url = "https://github.com/syedzubinhafiz/supermario"
//! entry_point = "edu.monash.fit2099.game.Application"
//! technologies = ["Java"]
//! ```

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::{Ecosystem, ProjectReference, SourceKind};
use crate::error::{ExecuteError, ExecuteResult};

/// How the program interacts with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Cli,
    Gui,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectKind::Cli => f.write_str("cli"),
            ProjectKind::Gui => f.write_str("gui"),
        }
    }
}

/// Catalog entry for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ecosystem: Ecosystem,
    #[serde(default = "default_kind")]
    pub kind: ProjectKind,
    #[serde(default = "default_source")]
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

fn default_kind() -> ProjectKind {
    ProjectKind::Cli
}

fn default_source() -> SourceKind {
    SourceKind::Local
}

impl ProjectMetadata {
    /// Build a reference from catalog data alone.
    pub fn to_reference(&self) -> ExecuteResult<ProjectReference> {
        let reference = match (self.source, self.remote_url.as_deref()) {
            (SourceKind::Remote, Some(url)) => {
                ProjectReference::remote(self.ecosystem, &self.id, url)?
            }
            (SourceKind::Remote, None) => {
                return Err(ExecuteError::invalid_request(format!(
                    "catalog entry `{}` is remote but has no remote_url",
                    self.id
                )))
            }
            (SourceKind::Local, _) => ProjectReference::local(self.ecosystem, &self.id)?,
        };

        Ok(match &self.entry_point {
            Some(entry) => reference.with_entry_point(entry.clone()),
            None => reference,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "project")]
    projects: Vec<ProjectMetadata>,
}

/// In-memory project catalog.
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    projects: Vec<ProjectMetadata>,
}

impl ProjectCatalog {
    /// Create a catalog from entries.
    pub fn new(projects: Vec<ProjectMetadata>) -> Self {
        ProjectCatalog { projects }
    }

    /// Parse a catalog from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents).context("failed to parse catalog")?;
        Ok(ProjectCatalog::new(file.projects))
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// Load a catalog, treating a missing file as an empty catalog.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load catalog from {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    /// Find a project by id.
    pub fn lookup(&self, id: &str) -> Option<&ProjectMetadata> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// All projects, in file order.
    pub fn all(&self) -> &[ProjectMetadata] {
        &self.projects
    }

    /// Projects of one ecosystem.
    pub fn by_ecosystem(&self, ecosystem: Ecosystem) -> impl Iterator<Item = &ProjectMetadata> {
        self.projects.iter().filter(move |p| p.ecosystem == ecosystem)
    }

    /// Projects of one kind.
    pub fn by_kind(&self, kind: ProjectKind) -> impl Iterator<Item = &ProjectMetadata> {
        self.projects.iter().filter(move |p| p.kind == kind)
    }

    /// Build the reference for a request.
    ///
    /// Values given by the caller win; anything left out is taken from the
    /// catalog entry of the same id and ecosystem, if there is one.
    pub fn reference(
        &self,
        ecosystem: Ecosystem,
        id: &str,
        overrides: ReferenceOverrides,
    ) -> ExecuteResult<ProjectReference> {
        let entry = self.lookup(id).filter(|p| p.ecosystem == ecosystem);

        let source = overrides
            .source
            .or(entry.map(|p| p.source))
            .unwrap_or(SourceKind::Local);
        let remote_url = overrides
            .remote_url
            .or_else(|| entry.and_then(|p| p.remote_url.clone()));
        let entry_point = overrides
            .entry_point
            .filter(|e| !e.trim().is_empty())
            .or_else(|| entry.and_then(|p| p.entry_point.clone()));

        let reference = match (source, remote_url) {
            (SourceKind::Local, _) => ProjectReference::local(ecosystem, id)?,
            (SourceKind::Remote, Some(url)) => ProjectReference::remote(ecosystem, id, &url)?,
            (SourceKind::Remote, None) => {
                return Err(ExecuteError::invalid_request("Invalid source configuration"))
            }
        };

        Ok(match entry_point {
            Some(entry_point) => reference.with_entry_point(entry_point),
            None => reference,
        })
    }
}

/// Request-supplied values that take precedence over the catalog.
#[derive(Debug, Clone, Default)]
pub struct ReferenceOverrides {
    pub source: Option<SourceKind>,
    pub remote_url: Option<String>,
    pub entry_point: Option<String>,
}
