//! `runway projects` command

use anyhow::Result;

use crate::cli::ProjectsArgs;
use runway::core::{ProjectCatalog, ProjectMetadata};
use runway::util::{GlobalContext, Shell};

pub fn execute(ctx: &GlobalContext, args: ProjectsArgs) -> Result<()> {
    let shell = Shell::from_flags(ctx.is_verbose(), !ctx.color(), args.json);
    let config = ctx.load_config();

    let catalog = if config.paths.catalog.exists() {
        ProjectCatalog::load(&config.paths.catalog)?
    } else {
        ProjectCatalog::default()
    };
    let projects: Vec<&ProjectMetadata> = match args.lang {
        Some(ecosystem) => catalog.by_ecosystem(ecosystem).collect(),
        None => catalog.all().iter().collect(),
    };

    if shell.is_json() {
        shell.json(&projects);
        return Ok(());
    }

    if projects.is_empty() {
        shell.note(format!("no projects in {}", config.paths.catalog.display()));
        return Ok(());
    }

    let mut table = String::new();
    for project in projects {
        table.push_str(&format!(
            "{:<24} {:<7} {:<4} {:<7} {}\n",
            project.id,
            project.ecosystem,
            project.kind,
            project.source,
            project.name,
        ));
    }
    shell.output(&table);
    Ok(())
}
