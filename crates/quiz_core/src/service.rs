//! crates/quiz_core/src/service.rs
//!
//! The operations the quiz engine exposes to callers. Each call fetches what
//! it needs from the knowledge store and then runs the pure pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::domain::{AccessDecision, AccessGateRecord, EntityId, GeneratedQuestion, ScopeRequest};
use crate::error::{QuizError, QuizResult};
use crate::gate;
use crate::ports::{KnowledgeFilter, KnowledgeStore};
use crate::scope;
use crate::selection;
use crate::template_bank::TemplateBank;

#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn KnowledgeStore>,
    bank: Arc<TemplateBank>,
    root_chapter_id: EntityId,
}

impl QuizService {
    /// `root_chapter_id` is the chapter that stands for "every knowledge entry".
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        bank: Arc<TemplateBank>,
        root_chapter_id: EntityId,
    ) -> Self {
        Self {
            store,
            bank,
            root_chapter_id,
        }
    }

    /// Generates up to `count` questions for a practice scope.
    ///
    /// An empty list is a valid answer: the scope may be unknown or have no
    /// questions. Only a negative count or a store failure is an error.
    pub async fn generate_questions<R: Rng + ?Sized>(
        &self,
        request: &ScopeRequest,
        count: i64,
        rng: &mut R,
    ) -> QuizResult<Vec<GeneratedQuestion>> {
        let count = validate_count(count)?;
        let entries = scope::resolve(self.store.as_ref(), request, self.root_chapter_id).await?;
        let scope_key = scope::relevance_key(request, self.root_chapter_id);

        let questions = selection::select_questions(&self.bank, &entries, scope_key, count, rng);
        info!(
            ?scope_key,
            requested = count,
            returned = questions.len(),
            "Generated practice questions"
        );
        Ok(questions)
    }

    /// Generates up to `count` questions from the entries of exactly one chapter.
    ///
    /// Unlike [`Self::generate_questions`] the root chapter is not special here
    /// and no relevance filter runs.
    pub async fn generate_chapter_questions<R: Rng + ?Sized>(
        &self,
        chapter_id: EntityId,
        count: i64,
        rng: &mut R,
    ) -> QuizResult<Vec<GeneratedQuestion>> {
        let count = validate_count(count)?;
        let entries = self
            .store
            .list_knowledge_entries(&KnowledgeFilter::chapters(vec![chapter_id]))
            .await?;

        let questions = selection::select_unfiltered(&self.bank, &entries, count, rng);
        info!(
            chapter_id,
            requested = count,
            returned = questions.len(),
            "Generated chapter questions"
        );
        Ok(questions)
    }

    pub async fn check_access(
        &self,
        user_id: EntityId,
        chapter_id: EntityId,
        now: DateTime<Utc>,
    ) -> QuizResult<AccessDecision> {
        let record = self.store.get_gate_record(user_id, chapter_id).await?;
        let decision = gate::evaluate(record.as_ref(), now);
        debug!(user_id, chapter_id, allowed = decision.allowed, "Checked chapter access");
        Ok(decision)
    }

    /// Records an attempt at `now`, locking the chapter for `cooldown_days`.
    pub async fn record_attempt(
        &self,
        user_id: EntityId,
        chapter_id: EntityId,
        cooldown_days: i64,
        now: DateTime<Utc>,
    ) -> QuizResult<AccessGateRecord> {
        let record = gate::attempt_record(user_id, chapter_id, cooldown_days, now)?;
        self.store.upsert_gate_record(&record).await?;
        info!(
            user_id,
            chapter_id,
            cooldown_days,
            next_available_at = %record.next_available_at,
            "Recorded quiz attempt"
        );
        Ok(record)
    }

    /// Every gate record of a user, ordered by chapter.
    pub async fn list_access_records(&self, user_id: EntityId) -> QuizResult<Vec<AccessGateRecord>> {
        Ok(self.store.list_gate_records(user_id).await?)
    }
}

fn validate_count(count: i64) -> QuizResult<usize> {
    usize::try_from(count)
        .map_err(|_| QuizError::InvalidRequest(format!("count must not be negative, got {count}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_invalid() {
        assert_eq!(validate_count(0).unwrap(), 0);
        assert_eq!(validate_count(10).unwrap(), 10);
        assert!(matches!(validate_count(-1), Err(QuizError::InvalidRequest(_))));
    }
}
