//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use runway::Ecosystem;

/// Runway - build and run Java and Python projects on demand
#[derive(Parser)]
#[command(name = "runway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build (if needed) and run a project
    Run(RunArgs),

    /// Show how a project directory would be built
    Detect(DetectArgs),

    /// List the projects in the catalog
    Projects(ProjectsArgs),

    /// Remove build output (and optionally cached checkouts)
    Clean(CleanArgs),

    /// Start the HTTP API
    Serve(ServeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Project identifier
    pub project: String,

    /// Project ecosystem (defaults to the catalog entry, then java)
    #[arg(long, short = 'l', value_name = "LANG")]
    pub lang: Option<Ecosystem>,

    /// Use the local projects directory
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Clone the project from a git repository
    #[arg(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Main class (Java) or main file (Python)
    #[arg(long, short = 'e', value_name = "ENTRY")]
    pub entry: Option<String>,

    /// Text fed to the program's standard input
    #[arg(long, conflicts_with = "stdin_file")]
    pub stdin: Option<String>,

    /// Read standard input for the program from a file
    #[arg(long, value_name = "PATH")]
    pub stdin_file: Option<PathBuf>,

    /// Execution timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Project directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Only list projects of this ecosystem
    #[arg(long, short = 'l', value_name = "LANG")]
    pub lang: Option<Ecosystem>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Project identifier
    pub project: String,

    /// Project ecosystem (defaults to the catalog entry, then java)
    #[arg(long, short = 'l', value_name = "LANG")]
    pub lang: Option<Ecosystem>,

    /// Also remove the cached checkout and virtual environment
    #[arg(long)]
    pub cache: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides the configured one)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Disable permissive CORS headers
    #[arg(long)]
    pub no_cors: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
