//! Command implementations

pub mod clean;
pub mod completions;
pub mod detect;
pub mod projects;
pub mod run;
pub mod serve;

use runway::core::{Ecosystem, ProjectCatalog};

/// Pick the ecosystem for a project: the flag, then the catalog, then java.
pub(crate) fn ecosystem_for(
    catalog: &ProjectCatalog,
    project: &str,
    flag: Option<Ecosystem>,
) -> Ecosystem {
    flag.or_else(|| catalog.lookup(project).map(|p| p.ecosystem))
        .unwrap_or(Ecosystem::Java)
}
