//! The secret-answer configuration form, independent of any rendering.
//!
//! The workflow owns a fixed number of slots. Each slot holds a question
//! selection and an answer, and no question may be selected in two slots.
//! Answers are replaced as a whole set: "editing" one answer means resetting
//! and submitting all of them again.

use std::fmt;

use crate::model::{About, AnswerSubmission, ConfiguredAnswer, QuestionId, SecretQuestion};
use crate::notice::{Notice, Notices};
use crate::paginate::PaginatedAggregator;
use crate::remote::{ApiError, RequestClient};

mod slots;

pub use self::slots::{Slot, SlotSet};

pub const ANSWERS_SET_MESSAGE: &str = "Your answers are set. Click on \"Reset\" to change them.";
pub const ANSWERS_RESET_MESSAGE: &str = "Your answers were reset successfully";
pub const REQUIREMENT_RAISED_MESSAGE: &str =
    "The administrator raised the number of required answers. Please reset your answers and set them again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    /// The user has answers on record; the form is read-only.
    Configured,
    /// No answers on record; slots are editable against the enabled catalog.
    Unconfigured,
    /// Loading the user's answers or the catalog failed. Nothing is retried.
    FatalError,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Loading => "loading",
            Phase::Configured => "configured",
            Phase::Unconfigured => "unconfigured",
            Phase::FatalError => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("This action is not available while the answers are {0}")]
    InvalidPhase(Phase),
    #[error("There is no question {}", .0 + 1)]
    NoSuchSlot(usize),
    #[error("Question {} cannot use question id {question_id}; it is unavailable or selected elsewhere", .slot + 1)]
    NotACandidate { slot: usize, question_id: QuestionId },
    #[error("Please select a question and enter an answer for question {}", .0 + 1)]
    Incomplete(usize),
    #[error("The answer to question {} must be at least {minimum} characters long", .slot + 1)]
    AnswerTooShort { slot: usize, minimum: usize },
    #[error("One or more answers were the same. Please provide unique answers.")]
    DuplicateAnswers,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct AnswerConfigurationWorkflow {
    about: About,
    aggregator: PaginatedAggregator,
    phase: Phase,
    /// Enabled catalog while unconfigured; the configured questions otherwise.
    questions: Vec<SecretQuestion>,
    slots: SlotSet,
    notices: Notices,
}

impl AnswerConfigurationWorkflow {
    pub fn new(about: About, aggregator: PaginatedAggregator) -> Self {
        Self {
            slots: SlotSet::new(about.required_answers),
            about,
            aggregator,
            phase: Phase::Uninitialized,
            questions: Vec::new(),
            notices: Notices::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn about(&self) -> &About {
        &self.about
    }

    pub fn questions(&self) -> &[SecretQuestion] {
        &self.questions
    }

    pub fn slots(&self) -> &[Slot] {
        self.slots.slots()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Loads the user's answers. Any existing answers put the workflow in
    /// [`Phase::Configured`] with one slot per answer, even if the required
    /// count changed since. Otherwise the enabled catalog is fetched.
    pub async fn initialize(&mut self, client: &RequestClient) -> Result<Phase, WorkflowError> {
        let previous = std::mem::replace(&mut self.phase, Phase::Loading);
        let answers = match client.get_answers().await {
            Ok(answers) => answers,
            Err(err) => return Err(self.fail(err)),
        };

        if answers.is_empty() {
            // Selections made against the catalog survive a reload.
            if previous != Phase::Unconfigured || self.slots.len() != self.about.required_answers {
                self.slots = SlotSet::new(self.about.required_answers);
            }
            return self.load_catalog(client).await;
        }

        self.adopt_configured(answers);
        Ok(self.phase)
    }

    /// Offered questions for slot `index`.
    pub fn candidates(&self, index: usize) -> Result<Vec<&SecretQuestion>, WorkflowError> {
        self.slots.candidates(index, &self.questions)
    }

    pub fn select(&mut self, index: usize, question_id: QuestionId) -> Result<(), WorkflowError> {
        self.require(Phase::Unconfigured)?;
        self.slots.select(index, question_id, &self.questions)
    }

    pub fn set_answer(&mut self, index: usize, answer: &str) -> Result<(), WorkflowError> {
        self.require(Phase::Unconfigured)?;
        self.slots.set_answer(index, answer)
    }

    /// Pre-selects the first unused catalog questions in empty slots.
    pub fn fill_default_selections(&mut self) -> Result<(), WorkflowError> {
        self.require(Phase::Unconfigured)?;
        self.slots.fill_defaults(&self.questions);
        Ok(())
    }

    /// The answer set as it would be submitted.
    pub fn readiness(&self) -> Result<Vec<AnswerSubmission>, WorkflowError> {
        self.require(Phase::Unconfigured)?;
        self.slots.readiness(
            self.about.answers_minimum_length,
            self.about.allow_duplicate_answers,
        )
    }

    pub fn can_submit(&self) -> bool {
        self.readiness().is_ok()
    }

    /// Submits every slot in one call and then reloads the server's view.
    /// A rejected submission leaves the form as it was.
    pub async fn submit(&mut self, client: &RequestClient) -> Result<Phase, WorkflowError> {
        let answers = self.readiness()?;
        self.phase = Phase::Loading;
        if let Err(err) = client.set_answers(&answers).await {
            tracing::info!(error = %err, "answer submission rejected");
            self.notices.push(Notice::error(err.to_string()));
            self.phase = Phase::Unconfigured;
            return Err(err.into());
        }
        tracing::info!(count = answers.len(), "secret answers submitted");
        self.initialize(client).await
    }

    /// Deletes the configured answers and reloads the enabled catalog into
    /// cleared slots.
    pub async fn reset(&mut self, client: &RequestClient) -> Result<Phase, WorkflowError> {
        self.require(Phase::Configured)?;
        self.phase = Phase::Loading;
        if let Err(err) = client.delete_answers().await {
            tracing::info!(error = %err, "answer reset rejected");
            self.notices.push(Notice::error(err.to_string()));
            self.phase = Phase::Configured;
            return Err(err.into());
        }
        tracing::info!("secret answers reset");
        self.notices.push(Notice::info(ANSWERS_RESET_MESSAGE));
        self.slots = SlotSet::new(self.about.required_answers);
        self.load_catalog(client).await
    }

    fn adopt_configured(&mut self, answers: Vec<ConfiguredAnswer>) {
        if answers.len() < self.about.required_answers {
            self.notices.push(Notice::error(REQUIREMENT_RAISED_MESSAGE));
        }
        self.slots = SlotSet::with_questions(answers.iter().map(ConfiguredAnswer::question_id));
        self.questions = answers.into_iter().map(|a| a.question).collect();
        self.phase = Phase::Configured;
        self.notices.push(Notice::info(ANSWERS_SET_MESSAGE));
        tracing::debug!(count = self.slots.len(), "answers already configured");
    }

    async fn load_catalog(&mut self, client: &RequestClient) -> Result<Phase, WorkflowError> {
        match client.all_enabled_questions(&self.aggregator).await {
            Ok(questions) => {
                tracing::debug!(count = questions.len(), "loaded enabled questions");
                self.questions = questions;
                self.phase = Phase::Unconfigured;
                Ok(self.phase)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: ApiError) -> WorkflowError {
        tracing::warn!(error = %err, "answer workflow cannot load");
        self.notices.push(Notice::error(err.to_string()));
        self.phase = Phase::FatalError;
        err.into()
    }

    fn require(&self, phase: Phase) -> Result<(), WorkflowError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(WorkflowError::InvalidPhase(self.phase))
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
