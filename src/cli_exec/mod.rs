use anyhow::{Context, Result};

use adreset::gate::Route;
use adreset::model::AnswerSubmission;
use adreset::notice::{Notice, NoticeLevel};
use adreset::portal::Portal;

use crate::{AnswersCommands, Commands, QuestionsCommands, discover_portal, require_route};

mod answers;
mod dispatch;
mod local;
mod questions;
mod session;

pub(super) async fn handle_command(command: Commands) -> Result<()> {
    dispatch::handle_command(command).await
}

/// Parses `ID=TEXT`.
pub(super) fn parse_answer(raw: &str) -> Result<AnswerSubmission> {
    let (id, answer) = raw
        .split_once('=')
        .with_context(|| format!("answer must look like ID=TEXT: {}", raw))?;
    let question_id = id
        .trim()
        .parse()
        .with_context(|| format!("invalid question id: {}", id))?;
    Ok(AnswerSubmission {
        question_id,
        answer: answer.to_string(),
    })
}

/// Prints informational notices. Errors reach the user as the command's
/// failure instead.
pub(super) fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        if notice.level != NoticeLevel::Error {
            println!("{}", notice.text);
        }
    }
}
