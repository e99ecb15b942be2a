//! `runway serve` command

use anyhow::{Context, Result};

use crate::cli::ServeArgs;
use runway::core::ProjectCatalog;
use runway::server::{RunwayServer, ServerConfig};
use runway::util::GlobalContext;
use runway::Orchestrator;

pub fn execute(ctx: &GlobalContext, args: ServeArgs) -> Result<()> {
    let config = ctx.load_config();

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let server_config = ServerConfig::new()
        .with_bind_addr_str(&bind)?
        .with_cors(!args.no_cors);

    let catalog = ProjectCatalog::load_or_default(&config.paths.catalog);
    tracing::info!("Loaded {} catalog entries", catalog.all().len());

    let server = RunwayServer::new(Orchestrator::new(config), catalog).with_config(server_config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(server.serve_with_shutdown(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
        }
    }))
}
