use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use adreset::gate::{Decision, Route};
use adreset::portal::Portal;
use adreset::store::LocalStore;

use crate::Commands;

#[derive(Parser)]
#[command(name = "adreset")]
#[command(about = "Self-service password reset portal client", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    runtime.block_on(crate::cli_exec::handle_command(cli.command))
}

pub(crate) fn discover_portal() -> Result<(LocalStore, Portal)> {
    let store = LocalStore::discover(&std::env::current_dir().context("get current dir")?)?;
    let config = store.read_config()?;
    let portal = Portal::new(config, Arc::new(store.clone()))?;
    Ok((store, portal))
}

/// Runs the route behind a command through the guard.
pub(crate) fn require_route(portal: &Portal, route: Route) -> Result<()> {
    match portal.check(&route) {
        Decision::Allow => Ok(()),
        Decision::RedirectToLogin { .. } => anyhow::bail!(
            "You must be logged-in to perform this action (run `adreset login --username ...`)"
        ),
        Decision::RedirectToHome { warning } => anyhow::bail!(warning),
    }
}
