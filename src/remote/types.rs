//! Wire envelopes for portal requests and responses.

use super::ApiError;
use crate::model::{PageResult, QuestionId};

#[derive(Debug, serde::Serialize)]
pub(super) struct LoginRequest<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct LoginResponse {
    #[serde(default)]
    pub(super) token: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub pages: u32,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// `{items, meta}` as returned by every paginated endpoint.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for PageResult<T> {
    fn from(page: Page<T>) -> Self {
        PageResult {
            items: page.items,
            total_count: page.meta.total,
            total_pages: page.meta.pages,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub(super) struct ResetPasswordRequest<'a> {
    pub(super) answers: &'a [crate::model::AnswerSubmission],
    pub(super) new_password: &'a str,
    pub(super) username: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct AddQuestionRequest<'a> {
    pub(super) question: &'a str,
}

pub(super) fn questions_path(page: u32, per_page: u32, enabled: Option<bool>) -> String {
    let mut path = format!("/questions?page={}&per_page={}", page, per_page);
    if let Some(enabled) = enabled {
        path.push_str(&format!("&enabled={}", enabled));
    }
    path
}

pub(super) fn question_path(id: QuestionId) -> String {
    format!("/questions/{}", id)
}

/// `/answers/{username}` with the username percent-encoded as one segment.
pub(super) fn user_answers_path(username: &str) -> Result<String, ApiError> {
    let mut url =
        reqwest::Url::parse("http://portal.invalid/answers").map_err(|_| ApiError::Unexpected)?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Unexpected)?
        .push(username);
    Ok(url.path().to_string())
}
