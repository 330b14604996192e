//! crates/quiz_core/src/selection.rs
//!
//! The selection and sampling pipeline: synthesize candidates, keep the
//! relevant ones, draw a bounded sample and shuffle each question's options.
//! Everything here is synchronous and works on data already fetched.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::domain::{Candidate, EntityId, GeneratedQuestion, KnowledgeEntry};
use crate::shuffle::shuffle_options;
use crate::synthesis::synthesize_all;
use crate::template_bank::TemplateBank;

/// Questions returned when the caller does not ask for a specific number.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Range the per-question quiz tag is drawn from.
pub const QUIZ_TAG_RANGE: RangeInclusive<u32> = 100_000..=999_999;

/// Non-empty categories present among `entries`.
pub fn categories_of(entries: &[KnowledgeEntry]) -> HashSet<String> {
    entries
        .iter()
        .filter(|e| !e.category.is_empty())
        .map(|e| e.category.clone())
        .collect()
}

/// Keeps the candidates relevant to the request.
///
/// With a scope key only candidates from that chapter survive, and an empty
/// result stays empty. Without one the category set narrows the candidates,
/// but if nothing matches every candidate is kept. With neither, nothing is
/// filtered.
pub fn filter_relevant(
    candidates: Vec<Candidate>,
    scope_key: Option<EntityId>,
    categories: Option<&HashSet<String>>,
) -> Vec<Candidate> {
    if let Some(key) = scope_key {
        return candidates
            .into_iter()
            .filter(|c| c.scope_id == Some(key))
            .collect();
    }

    let Some(categories) = categories else {
        return candidates;
    };
    if candidates.iter().any(|c| categories.contains(&c.category)) {
        candidates
            .into_iter()
            .filter(|c| categories.contains(&c.category))
            .collect()
    } else {
        candidates
    }
}

/// Draws up to `count` candidates without replacement.
///
/// When there are fewer candidates than requested all of them are returned in
/// their original order.
pub fn sample<R: Rng + ?Sized>(
    mut candidates: Vec<Candidate>,
    count: usize,
    rng: &mut R,
) -> Vec<Candidate> {
    if candidates.len() >= count {
        candidates.shuffle(rng);
        candidates.truncate(count);
    }
    candidates
}

/// Shuffles each candidate's options and numbers the questions from 1.
pub fn finalize<R: Rng + ?Sized>(candidates: Vec<Candidate>, rng: &mut R) -> Vec<GeneratedQuestion> {
    let mut questions = Vec::with_capacity(candidates.len());
    for c in candidates {
        let Some((options, correct_index)) = shuffle_options(&c.options, c.correct_index, rng)
        else {
            warn!(prompt = %c.prompt, "Skipping candidate with an out-of-range answer");
            continue;
        };
        questions.push(GeneratedQuestion {
            display_id: questions.len() + 1,
            quiz_tag: rng.gen_range(QUIZ_TAG_RANGE),
            prompt: c.prompt,
            options,
            correct_index,
            category: c.category,
            scope_id: c.scope_id,
            explanation: c.explanation,
        });
    }
    questions
}

/// Runs the full pipeline over the entries of an already resolved scope.
///
/// `scope_key` is the chapter the request named, if any. Without one the
/// categories of `entries` act as the relevance key.
pub fn select_questions<R: Rng + ?Sized>(
    bank: &TemplateBank,
    entries: &[KnowledgeEntry],
    scope_key: Option<EntityId>,
    count: usize,
    rng: &mut R,
) -> Vec<GeneratedQuestion> {
    let candidates = synthesize_all(bank, entries, rng);
    let categories = scope_key.is_none().then(|| categories_of(entries));
    let relevant = filter_relevant(candidates, scope_key, categories.as_ref());
    finalize(sample(relevant, count, rng), rng)
}

/// Pipeline variant with no relevance filtering, for single-chapter practice.
pub fn select_unfiltered<R: Rng + ?Sized>(
    bank: &TemplateBank,
    entries: &[KnowledgeEntry],
    count: usize,
    rng: &mut R,
) -> Vec<GeneratedQuestion> {
    let candidates = synthesize_all(bank, entries, rng);
    finalize(sample(candidates, count, rng), rng)
}
