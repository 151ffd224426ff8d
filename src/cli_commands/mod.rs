use clap::Subcommand;

use crate::{AnswersCommands, QuestionsCommands};

pub(crate) mod local;
pub(crate) mod session;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Initialize a client directory (.adreset)
    Init(local::InitArgs),

    /// Log in to the portal and store the session token
    Login(session::LoginArgs),

    /// Log out (revoke and clear the stored token)
    Logout,

    /// Show the current session
    Whoami(session::WhoamiArgs),

    /// Show the portal's capability descriptor
    About(local::AboutArgs),

    /// Manage secret questions (admin)
    Questions {
        #[command(subcommand)]
        command: QuestionsCommands,
    },

    /// Manage your secret answers
    Answers {
        #[command(subcommand)]
        command: AnswersCommands,
    },

    /// Reset a forgotten password by answering secret questions
    Recover(session::RecoverArgs),
}
