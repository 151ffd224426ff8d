//! Configured-answer operations and the unauthenticated reset endpoints.

use super::*;
use crate::model::{AnswerSubmission, ConfiguredAnswer};
use crate::paginate::PaginatedAggregator;

/// No deployment requires anywhere near this many answers, so one page
/// holds them all.
const ANSWERS_PER_PAGE: u32 = 100;

impl RequestClient {
    /// The logged-in user's configured answers.
    pub async fn get_answers(&self) -> Result<Vec<ConfiguredAnswer>, ApiError> {
        let page: Page<ConfiguredAnswer> = self
            .call(
                ApiRequest::get(format!("/answers?per_page={}", ANSWERS_PER_PAGE))
                    .requires(Role::User),
            )
            .await?;
        Ok(page.items)
    }

    /// Replaces the full answer set in one call.
    pub async fn set_answers(&self, answers: &[AnswerSubmission]) -> Result<(), ApiError> {
        let body = serde_json::to_value(answers).map_err(|_| ApiError::Unexpected)?;
        self.call_unit(ApiRequest::post("/answers").json(body).requires(Role::User))
            .await
    }

    pub async fn delete_answers(&self) -> Result<(), ApiError> {
        self.call_unit(ApiRequest::delete("/answers").requires(Role::User))
            .await
    }

    /// Questions `username` configured, for recovery without a session.
    pub async fn user_answers(
        &self,
        username: &str,
        aggregator: &PaginatedAggregator,
    ) -> Result<Vec<ConfiguredAnswer>, ApiError> {
        let base = user_answers_path(username.trim())?;
        aggregator
            .fetch_all(|page, per_page| {
                let req = ApiRequest::get(format!("{}?page={}&per_page={}", base, page, per_page));
                async move {
                    let page: Page<ConfiguredAnswer> = self.call(req).await?;
                    Ok(page.into())
                }
            })
            .await
    }

    pub async fn reset_password(
        &self,
        username: &str,
        answers: &[AnswerSubmission],
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(ResetPasswordRequest {
            answers,
            new_password,
            username,
        })
        .map_err(|_| ApiError::Unexpected)?;
        self.call_unit(ApiRequest::post("/reset").json(body)).await?;
        tracing::info!(user = username, "password reset through secret questions");
        Ok(())
    }
}
