//! Secret question catalog operations.

use super::*;
use crate::model::{PageResult, QuestionId, SecretQuestion};
use crate::paginate::PaginatedAggregator;

/// Operation key for the admin page view; a newer page load replaces an
/// older one.
pub const QUESTIONS_PAGE_KEY: &str = "questions.page";

/// Fields an administrator may change on a question.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct QuestionPatch {
    #[serde(rename = "question", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl RequestClient {
    /// One page of questions. `op_key` makes the call supersede earlier
    /// calls under the same key.
    pub async fn list_questions(
        &self,
        page: u32,
        per_page: u32,
        enabled: Option<bool>,
        op_key: Option<&str>,
    ) -> Result<PageResult<SecretQuestion>, ApiError> {
        let mut req = ApiRequest::get(questions_path(page, per_page, enabled));
        if let Some(key) = op_key {
            req = req.superseding(key);
        }
        let page: Page<SecretQuestion> = self.call(req).await?;
        Ok(page.into())
    }

    /// Every question matching `enabled`, fetched page by page.
    pub async fn all_questions(
        &self,
        aggregator: &PaginatedAggregator,
        enabled: Option<bool>,
    ) -> Result<Vec<SecretQuestion>, ApiError> {
        aggregator
            .fetch_all(|page, per_page| self.list_questions(page, per_page, enabled, None))
            .await
    }

    pub async fn all_enabled_questions(
        &self,
        aggregator: &PaginatedAggregator,
    ) -> Result<Vec<SecretQuestion>, ApiError> {
        self.all_questions(aggregator, Some(true)).await
    }

    pub async fn add_question(&self, text: &str) -> Result<SecretQuestion, ApiError> {
        let body = serde_json::to_value(AddQuestionRequest { question: text })
            .map_err(|_| ApiError::Unexpected)?;
        self.call(ApiRequest::post("/questions").json(body).requires(Role::Admin))
            .await
    }

    pub async fn patch_question(
        &self,
        id: QuestionId,
        patch: &QuestionPatch,
    ) -> Result<SecretQuestion, ApiError> {
        let body = serde_json::to_value(patch).map_err(|_| ApiError::Unexpected)?;
        self.call(
            ApiRequest::patch(question_path(id))
                .json(body)
                .requires(Role::Admin),
        )
        .await
    }
}
