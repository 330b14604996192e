//! crates/quiz_core/src/synthesis.rs
//!
//! Turns knowledge entries into candidate questions, using the template bank
//! when the title is known and a generic "which statement is true" question
//! built from the entry content otherwise.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::domain::{Candidate, KnowledgeEntry, QuestionTemplate};
use crate::template_bank::{generic_explanation, generic_prompt, TemplateBank, GENERIC_DISTRACTORS};

/// Characters that end a sentence in entry content. `.` is left out so decimals survive.
const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '!', '?', '\n'];

/// Synthesizes one candidate for `entry`, or `None` if the entry cannot produce a question.
///
/// Entries with an empty title or content are skipped silently.
pub fn synthesize<R: Rng + ?Sized>(
    bank: &TemplateBank,
    entry: &KnowledgeEntry,
    rng: &mut R,
) -> Option<Candidate> {
    if entry.title.is_empty() || entry.content.is_empty() {
        return None;
    }

    match bank.templates_for(&entry.title).choose(rng) {
        Some(template) => Some(from_template(template, entry)),
        None => generic_candidate(entry, rng),
    }
}

/// Synthesizes a candidate for every entry, dropping the ones that yield nothing.
pub fn synthesize_all<R: Rng + ?Sized>(
    bank: &TemplateBank,
    entries: &[KnowledgeEntry],
    rng: &mut R,
) -> Vec<Candidate> {
    let candidates: Vec<Candidate> = entries
        .iter()
        .filter_map(|entry| synthesize(bank, entry, rng))
        .collect();
    debug!(
        entries = entries.len(),
        candidates = candidates.len(),
        "Synthesized candidate questions"
    );
    candidates
}

/// Splits content into trimmed, non-empty sentences.
pub fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split(SENTENCE_TERMINATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn from_template(template: &QuestionTemplate, entry: &KnowledgeEntry) -> Candidate {
    Candidate {
        prompt: template.prompt.to_string(),
        options: template.options.iter().map(|o| o.to_string()).collect(),
        correct_index: template.correct_index,
        category: entry.category.clone(),
        scope_id: entry.chapter_id,
        explanation: template.explanation.to_string(),
    }
}

fn generic_candidate<R: Rng + ?Sized>(entry: &KnowledgeEntry, rng: &mut R) -> Option<Candidate> {
    let sentences = split_sentences(&entry.content);
    let fact = sentences.choose(rng)?;

    let mut options = Vec::with_capacity(1 + GENERIC_DISTRACTORS.len());
    options.push(fact.to_string());
    options.extend(GENERIC_DISTRACTORS.iter().map(|d| d.to_string()));

    Some(Candidate {
        prompt: generic_prompt(&entry.title),
        options,
        correct_index: 0,
        category: entry.category.clone(),
        scope_id: entry.chapter_id,
        explanation: generic_explanation(&entry.title, &entry.content),
    })
}
