use std::path::PathBuf;

use adreset::model::{ClientConfig, DEFAULT_API_URL};
use adreset::store::LocalStore;

use super::*;

pub(super) fn handle_init_command(
    api_url: Option<String>,
    force: bool,
    path: Option<PathBuf>,
) -> Result<()> {
    let root = path.unwrap_or(std::env::current_dir().context("get current dir")?);
    let config = ClientConfig::new(api_url.as_deref().unwrap_or(DEFAULT_API_URL));
    LocalStore::init(&root, &config, force)?;
    println!("Initialized adreset client at {}", root.display());
    println!("api: {}", config.api_url);
    Ok(())
}

pub(super) async fn handle_about_command(json: bool) -> Result<()> {
    let (_, portal) = discover_portal()?;
    let about = portal.about().await?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&about).context("serialize about json")?
        );
    } else {
        println!("required answers: {}", about.required_answers);
        println!("answer minimum length: {}", about.answers_minimum_length);
        println!("duplicate answers allowed: {}", about.allow_duplicate_answers);
        println!("account status: {}", about.account_status_enabled);
        if let Some(version) = about.version {
            println!("version: {}", version);
        }
    }
    Ok(())
}
