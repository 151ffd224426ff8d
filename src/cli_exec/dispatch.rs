use super::answers::handle_answers_command;
use super::local::{handle_about_command, handle_init_command};
use super::questions::handle_questions_command;
use super::session::{
    handle_login_command, handle_logout_command, handle_recover_command, handle_whoami_command,
};
use super::*;

pub(super) async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Init(args) => handle_init_command(args.api_url, args.force, args.path)?,
        Commands::Login(args) => handle_login_command(args.username, args.password).await?,
        Commands::Logout => handle_logout_command().await?,
        Commands::Whoami(args) => handle_whoami_command(args.json)?,
        Commands::About(args) => handle_about_command(args.json).await?,
        Commands::Questions { command } => handle_questions_command(command).await?,
        Commands::Answers { command } => handle_answers_command(command).await?,
        Commands::Recover(args) => handle_recover_command(args).await?,
    }

    Ok(())
}
