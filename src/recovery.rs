//! Password reset through previously configured secret questions.
//!
//! Runs without a session: the user names their account, answers the
//! questions they configured and picks a new password.

use crate::model::{AnswerSubmission, QuestionId, SecretQuestion};
use crate::notice::{Notice, Notices};
use crate::paginate::PaginatedAggregator;
use crate::remote::{ApiError, RequestClient};

pub const RESET_SUCCESS_MESSAGE: &str = "Your password was successfully reset";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    #[error("Please log out before resetting your password")]
    LoggedIn,
    #[error("Please enter your username")]
    MissingUsername,
    #[error(
        "You may not use this feature because you have not previously configured your secret questions"
    )]
    NotConfigured,
    #[error("Enter a username to load its secret questions first")]
    NotLoaded,
    #[error("Please answer the question with the ID {0}")]
    MissingAnswer(QuestionId),
    #[error("The question with the ID {0} is not one of your secret questions")]
    UnknownQuestion(QuestionId),
    #[error("The provided new passwords do not match. Please try again.")]
    PasswordMismatch,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryPhase {
    /// No username loaded yet.
    Idle,
    /// Questions loaded, waiting for answers.
    Ready,
    Done,
    /// The server locked the account after too many failed attempts.
    Locked,
}

pub struct RecoveryFlow {
    client: RequestClient,
    aggregator: PaginatedAggregator,
    phase: RecoveryPhase,
    username: Option<String>,
    questions: Vec<SecretQuestion>,
    notices: Notices,
}

impl RecoveryFlow {
    pub fn new(client: RequestClient, aggregator: PaginatedAggregator) -> Self {
        Self {
            client,
            aggregator,
            phase: RecoveryPhase::Idle,
            username: None,
            questions: Vec::new(),
            notices: Notices::default(),
        }
    }

    pub fn phase(&self) -> RecoveryPhase {
        self.phase
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Questions the loaded user must answer, in their configured order.
    pub fn questions(&self) -> &[SecretQuestion] {
        &self.questions
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Fetches the questions `username` configured.
    pub async fn load(&mut self, username: &str) -> Result<&[SecretQuestion], RecoveryError> {
        self.phase = RecoveryPhase::Idle;
        self.username = None;
        self.questions.clear();

        if self.client.session().is_logged_in() {
            return Err(self.refuse(RecoveryError::LoggedIn));
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(RecoveryError::MissingUsername);
        }

        let configured = self
            .client
            .user_answers(username, &self.aggregator)
            .await
            .map_err(|err| self.refuse(err.into()))?;
        if configured.is_empty() {
            return Err(self.refuse(RecoveryError::NotConfigured));
        }

        self.username = Some(username.to_string());
        self.questions = configured.into_iter().map(|a| a.question).collect();
        self.phase = RecoveryPhase::Ready;
        Ok(&self.questions)
    }

    /// Submits one answer per loaded question together with the new
    /// password, which must be typed twice.
    pub async fn submit(
        &mut self,
        answers: &[AnswerSubmission],
        new_password: &str,
        new_password_repeat: &str,
    ) -> Result<(), RecoveryError> {
        let Some(username) = self.username.clone().filter(|_| self.phase == RecoveryPhase::Ready)
        else {
            return Err(RecoveryError::NotLoaded);
        };
        if new_password != new_password_repeat {
            return Err(self.refuse(RecoveryError::PasswordMismatch));
        }
        let ordered = self.order_answers(answers)?;

        match self
            .client
            .reset_password(&username, &ordered, new_password)
            .await
        {
            Ok(()) => {
                self.phase = RecoveryPhase::Done;
                self.notices.push(Notice::info(RESET_SUCCESS_MESSAGE));
                Ok(())
            }
            Err(err) => {
                if let ApiError::ServerMessage(msg) = &err
                    && msg.contains("locked")
                {
                    tracing::info!(user = %username, "account locked during password reset");
                    self.phase = RecoveryPhase::Locked;
                }
                Err(self.refuse(err.into()))
            }
        }
    }

    /// Puts `answers` in configured order, one per question.
    fn order_answers(
        &self,
        answers: &[AnswerSubmission],
    ) -> Result<Vec<AnswerSubmission>, RecoveryError> {
        if let Some(extra) = answers
            .iter()
            .find(|a| !self.questions.iter().any(|q| q.id == a.question_id))
        {
            return Err(RecoveryError::UnknownQuestion(extra.question_id));
        }
        self.questions
            .iter()
            .map(|q| {
                answers
                    .iter()
                    .find(|a| a.question_id == q.id && !a.answer.trim().is_empty())
                    .map(|a| AnswerSubmission {
                        question_id: q.id,
                        answer: a.answer.trim().to_string(),
                    })
                    .ok_or(RecoveryError::MissingAnswer(q.id))
            })
            .collect()
    }

    fn refuse(&mut self, err: RecoveryError) -> RecoveryError {
        self.notices.push(Notice::error(err.to_string()));
        err
    }
}

#[cfg(test)]
#[path = "tests/recovery_tests.rs"]
mod tests;
