//! Administrator view over the secret question catalog.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::{QuestionId, SecretQuestion};
use crate::notice::{Notice, Notices};
use crate::remote::{ApiError, QUESTIONS_PAGE_KEY, QuestionPatch, RequestClient};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const EMPTY_QUESTION_MESSAGE: &str =
    "You must enter a value before trying to add a secret question";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("You must enter a value before trying to add a secret question")]
    EmptyQuestion,
    #[error("The question with the ID {0} is not on this page")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the admin table currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub page: u32,
    pub pages: u32,
    pub questions: Vec<SecretQuestion>,
}

struct State {
    view: PageView,
    notices: Notices,
}

/// One page of the catalog at a time.
///
/// Page loads run under [`QUESTIONS_PAGE_KEY`]: when the admin flips pages
/// faster than the server answers, only the newest load updates the view.
pub struct QuestionPager {
    client: RequestClient,
    per_page: u32,
    state: Mutex<State>,
}

impl QuestionPager {
    pub fn new(client: RequestClient) -> Self {
        Self::with_page_size(client, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(client: RequestClient, per_page: u32) -> Self {
        Self {
            client,
            per_page: per_page.max(1),
            state: Mutex::new(State {
                view: PageView {
                    page: 1,
                    pages: 0,
                    questions: Vec::new(),
                },
                notices: Notices::default(),
            }),
        }
    }

    pub fn view(&self) -> PageView {
        self.lock().view.clone()
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.lock().notices.take()
    }

    /// Loads `page`. A load superseded by a newer one returns
    /// [`ApiError::Cancelled`] and leaves the view alone.
    pub async fn load(&self, page: u32) -> Result<(), AdminError> {
        let page = page.max(1);
        let result = self
            .client
            .list_questions(page, self.per_page, None, Some(QUESTIONS_PAGE_KEY))
            .await;
        let mut state = self.lock();
        match result {
            Ok(loaded) => {
                state.view = PageView {
                    page,
                    pages: loaded.total_pages,
                    questions: loaded.items,
                };
                Ok(())
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled.into()),
            Err(err) => {
                state.notices.push(Notice::error(err.to_string()));
                Err(err.into())
            }
        }
    }

    pub async fn reload(&self) -> Result<(), AdminError> {
        let page = self.lock().view.page;
        self.load(page).await
    }

    /// Adds a question and reloads the current page.
    pub async fn add_question(&self, text: &str) -> Result<SecretQuestion, AdminError> {
        let text = text.trim();
        if text.is_empty() {
            self.notify(Notice::error(EMPTY_QUESTION_MESSAGE));
            return Err(AdminError::EmptyQuestion);
        }
        let added = self
            .client
            .add_question(text)
            .await
            .map_err(|err| self.report(err))?;
        tracing::info!(id = added.id, "secret question added");
        self.reload().await?;
        Ok(added)
    }

    pub async fn set_enabled(&self, id: QuestionId, enabled: bool) -> Result<(), AdminError> {
        self.require_on_page(id)?;
        let patch = QuestionPatch {
            enabled: Some(enabled),
            ..QuestionPatch::default()
        };
        let updated = self
            .client
            .patch_question(id, &patch)
            .await
            .map_err(|err| self.report(err))?;
        let verb = if updated.enabled { "enabled" } else { "disabled" };
        self.replace_row(updated);
        self.notify(Notice::success(format!("The question was {}", verb)));
        Ok(())
    }

    pub async fn edit_text(&self, id: QuestionId, text: &str) -> Result<(), AdminError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AdminError::EmptyQuestion);
        }
        self.require_on_page(id)?;
        let patch = QuestionPatch {
            text: Some(text.to_string()),
            ..QuestionPatch::default()
        };
        let updated = self
            .client
            .patch_question(id, &patch)
            .await
            .map_err(|err| self.report(err))?;
        self.replace_row(updated);
        Ok(())
    }

    fn require_on_page(&self, id: QuestionId) -> Result<(), AdminError> {
        if self.lock().view.questions.iter().any(|q| q.id == id) {
            Ok(())
        } else {
            Err(AdminError::UnknownQuestion(id))
        }
    }

    fn replace_row(&self, updated: SecretQuestion) {
        let mut state = self.lock();
        if let Some(row) = state.view.questions.iter_mut().find(|q| q.id == updated.id) {
            *row = updated;
        }
    }

    fn report(&self, err: ApiError) -> AdminError {
        self.notify(Notice::error(err.to_string()));
        err.into()
    }

    fn notify(&self, notice: Notice) {
        self.lock().notices.push(notice);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
