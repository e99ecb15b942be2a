//! Runway CLI - build and run Java and Python projects on demand

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use runway::GlobalContext;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("runway=debug")
        } else {
            EnvFilter::new("runway=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);

    // Execute command
    match cli.command {
        Commands::Run(args) => commands::run::execute(&ctx, args),
        Commands::Detect(args) => commands::detect::execute(&ctx, args),
        Commands::Projects(args) => commands::projects::execute(&ctx, args),
        Commands::Clean(args) => commands::clean::execute(&ctx, args),
        Commands::Serve(args) => commands::serve::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
