//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the quiz engine.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

/// Identifier type shared by knowledge entries, chapters and users.
pub type EntityId = i64;

/// A single curated fact that questions are synthesized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub id: EntityId,
    /// Join key into the template bank.
    pub title: String,
    pub content: String,
    pub category: String,
    pub chapter_id: Option<EntityId>,
    pub course_code: Option<String>,
}

/// Depth of a chapter in the two-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChapterLevel {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterNode {
    pub id: EntityId,
    pub name: String,
    pub level: ChapterLevel,
    pub parent_id: Option<EntityId>,
}

impl ChapterNode {
    pub fn first_level(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: ChapterLevel::First,
            parent_id: None,
        }
    }

    pub fn second_level(id: EntityId, name: impl Into<String>, parent_id: EntityId) -> Self {
        Self {
            id,
            name: name.into(),
            level: ChapterLevel::Second,
            parent_id: Some(parent_id),
        }
    }
}

/// An immutable, hand-written multiple-choice question compiled into the template bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionTemplate {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    pub correct_index: usize,
    pub explanation: &'static str,
}

impl QuestionTemplate {
    pub fn correct_option(&self) -> &'static str {
        self.options[self.correct_index]
    }
}

/// A synthesized question before relevance filtering, sampling and option shuffling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub category: String,
    pub scope_id: Option<EntityId>,
    pub explanation: String,
}

/// A question handed to a caller. Created per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuestion {
    /// 1-based position in the returned list.
    pub display_id: usize,
    /// Opaque random tag so a client can tell two question sets apart.
    pub quiz_tag: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub category: String,
    pub scope_id: Option<EntityId>,
    pub explanation: String,
}

impl GeneratedQuestion {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// The practice scope a caller asks questions for.
///
/// Either `chapter_id` is set directly, or the two-level pair is used.
/// An empty request means every knowledge entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequest {
    pub chapter_id: Option<EntityId>,
    pub first_level_id: Option<EntityId>,
    pub second_level_id: Option<EntityId>,
    /// Optional extra narrowing on the knowledge entries' course code.
    pub course_code: Option<String>,
}

impl ScopeRequest {
    pub fn chapter(chapter_id: EntityId) -> Self {
        Self {
            chapter_id: Some(chapter_id),
            ..Self::default()
        }
    }

    pub fn levels(first_level_id: Option<EntityId>, second_level_id: Option<EntityId>) -> Self {
        Self {
            first_level_id,
            second_level_id,
            ..Self::default()
        }
    }
}

/// Per-user, per-chapter cooldown state. One record per `(user_id, chapter_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGateRecord {
    pub user_id: EntityId,
    pub chapter_id: EntityId,
    pub last_attempt_at: DateTime<Utc>,
    pub next_available_at: DateTime<Utc>,
    pub cooldown_days: i64,
}

/// The answer to "may this user start a new attempt on this chapter now?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    /// Only set while the chapter is locked.
    pub next_available_at: Option<DateTime<Utc>>,
    pub remaining_seconds: i64,
}

impl AccessDecision {
    pub fn unlocked() -> Self {
        Self {
            allowed: true,
            next_available_at: None,
            remaining_seconds: 0,
        }
    }
}
