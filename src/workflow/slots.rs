use std::collections::HashSet;

use crate::model::{AnswerSubmission, QuestionId, SecretQuestion};

use super::WorkflowError;

/// One question/answer position in the answer form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    pub question_id: Option<QuestionId>,
    pub answer: String,
}

/// Fixed-length slot list in which no question id appears twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotSet {
    slots: Vec<Slot>,
}

impl SlotSet {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Slot::default(); len],
        }
    }

    /// Slots pre-selected with already configured questions. Answers stay
    /// empty since the server never returns them.
    pub fn with_questions(ids: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            slots: ids
                .into_iter()
                .map(|id| Slot {
                    question_id: Some(id),
                    answer: String::new(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Result<&Slot, WorkflowError> {
        self.slots.get(index).ok_or(WorkflowError::NoSuchSlot(index))
    }

    /// `pool` minus every question selected in another slot. The slot's own
    /// selection stays in its list.
    pub fn candidates<'a>(
        &self,
        index: usize,
        pool: &'a [SecretQuestion],
    ) -> Result<Vec<&'a SecretQuestion>, WorkflowError> {
        self.get(index)?;
        let taken = self.taken_except(index);
        Ok(pool.iter().filter(|q| !taken.contains(&q.id)).collect())
    }

    /// Selects `question_id` in slot `index`. Other slots are left as they
    /// are.
    pub fn select(
        &mut self,
        index: usize,
        question_id: QuestionId,
        pool: &[SecretQuestion],
    ) -> Result<(), WorkflowError> {
        let is_candidate = self
            .candidates(index, pool)?
            .iter()
            .any(|q| q.id == question_id);
        if !is_candidate {
            return Err(WorkflowError::NotACandidate {
                slot: index,
                question_id,
            });
        }
        self.slots[index].question_id = Some(question_id);
        Ok(())
    }

    pub fn set_answer(&mut self, index: usize, answer: &str) -> Result<(), WorkflowError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(WorkflowError::NoSuchSlot(index))?;
        slot.answer = answer.trim().to_string();
        Ok(())
    }

    /// Gives every empty slot the first question of `pool` not used
    /// elsewhere, in pool order.
    pub fn fill_defaults(&mut self, pool: &[SecretQuestion]) {
        for index in 0..self.slots.len() {
            if self.slots[index].question_id.is_some() {
                continue;
            }
            let taken = self.taken_except(index);
            self.slots[index].question_id =
                pool.iter().map(|q| q.id).find(|id| !taken.contains(id));
        }
    }

    /// The submission for the whole set, or the first reason it is not ready.
    pub fn readiness(
        &self,
        minimum_length: usize,
        allow_duplicate_answers: bool,
    ) -> Result<Vec<AnswerSubmission>, WorkflowError> {
        let mut ids = HashSet::new();
        let mut answers = HashSet::new();
        let mut out = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(question_id) = slot.question_id else {
                return Err(WorkflowError::Incomplete(index));
            };
            if slot.answer.is_empty() {
                return Err(WorkflowError::Incomplete(index));
            }
            if slot.answer.chars().count() < minimum_length {
                return Err(WorkflowError::AnswerTooShort {
                    slot: index,
                    minimum: minimum_length,
                });
            }
            if !ids.insert(question_id) {
                return Err(WorkflowError::NotACandidate {
                    slot: index,
                    question_id,
                });
            }
            if !allow_duplicate_answers && !answers.insert(slot.answer.as_str()) {
                return Err(WorkflowError::DuplicateAnswers);
            }
            out.push(AnswerSubmission {
                question_id,
                answer: slot.answer.clone(),
            });
        }
        Ok(out)
    }

    fn taken_except(&self, index: usize) -> HashSet<QuestionId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .filter_map(|(_, s)| s.question_id)
            .collect()
    }
}
