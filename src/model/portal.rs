//! Records exchanged with the portal API.

use serde::{Deserialize, Serialize};

pub type QuestionId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretQuestion {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub text: String,
    pub enabled: bool,
}

/// A configured answer as the server reports it. The secret itself is
/// write-only and never comes back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredAnswer {
    #[serde(default)]
    pub id: Option<i64>,
    pub question: SecretQuestion,
}

impl ConfiguredAnswer {
    pub fn question_id(&self) -> QuestionId {
        self.question.id
    }
}

/// One `{question_id, answer}` pair as submitted to `/answers` or `/reset`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub question_id: QuestionId,
    pub answer: String,
}

/// The `/about` capability descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub required_answers: usize,
    #[serde(default)]
    pub answers_minimum_length: usize,
    #[serde(default)]
    pub allow_duplicate_answers: bool,
    #[serde(default)]
    pub account_status_enabled: bool,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
        }
    }
}
