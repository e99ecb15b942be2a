//! `runway clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use runway::core::{ProjectCatalog, ReferenceOverrides};
use runway::util::{GlobalContext, Shell, Status};
use runway::Orchestrator;

pub fn execute(ctx: &GlobalContext, args: CleanArgs) -> Result<()> {
    let shell = Shell::from_flags(ctx.is_verbose(), !ctx.color(), false);
    let config = ctx.load_config();

    let catalog = ProjectCatalog::load_or_default(&config.paths.catalog);
    let ecosystem = super::ecosystem_for(&catalog, &args.project, args.lang);
    let reference = catalog.reference(ecosystem, &args.project, ReferenceOverrides::default())?;

    let orchestrator = Orchestrator::new(config);
    let removed = orchestrator.clean(&reference, args.cache)?;

    if removed.is_empty() {
        shell.note(format!("nothing to clean for `{}`", args.project));
    }
    for path in removed {
        shell.status(Status::Removed, path.display());
    }
    Ok(())
}
