use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub(crate) struct InitArgs {
    /// Portal API base URL
    #[arg(long)]
    pub(crate) api_url: Option<String>,
    /// Re-initialize if .adreset already exists
    #[arg(long)]
    pub(crate) force: bool,
    /// Path to initialize (defaults to current directory)
    #[arg(long)]
    pub(crate) path: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct AboutArgs {
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}
