//! `runway detect` command

use anyhow::{bail, Result};
use serde_json::json;

use crate::cli::DetectArgs;
use runway::builder::{adhoc, classify, find_bundle, tool};
use runway::util::{GlobalContext, Shell, Status};

pub fn execute(ctx: &GlobalContext, args: DetectArgs) -> Result<()> {
    let shell = Shell::from_flags(ctx.is_verbose(), !ctx.color(), args.json);
    let config = ctx.load_config();

    let root = if args.path.is_absolute() {
        args.path.clone()
    } else {
        ctx.cwd().join(&args.path)
    };
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let kind = classify(&root);
    let command = tool::build_command(&root, kind, &config.java).map(|cmd| cmd.display_command());
    let bundle = find_bundle(&root, kind)?;
    let sources = adhoc::source_root(&root);

    if shell.is_json() {
        shell.json(&json!({
            "path": root,
            "kind": kind,
            "buildCommand": command,
            "bundle": bundle,
            "sourceRoot": sources,
        }));
        return Ok(());
    }

    shell.status(Status::Detected, format!("{} project at {}", kind, root.display()));
    match command {
        Some(command) => shell.note(format!("build with `{}`", command)),
        None => shell.note(format!("compile sources under {}", sources.display())),
    }
    if let Some(bundle) = bundle {
        shell.note(format!("existing bundle {}", bundle.display()));
    }
    shell.output(kind.as_str());
    Ok(())
}
