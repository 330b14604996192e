//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) the quiz engine depends on.
//! The knowledge store owns all durable state: knowledge entries, the chapter
//! tree and the access gate records. The engine only reads from it, except
//! for the gate upsert.

use async_trait::async_trait;

use crate::domain::{AccessGateRecord, EntityId, KnowledgeEntry};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Stored data is malformed: {0}")]
    InvalidData(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Query Types
//=========================================================================================

/// Narrows `list_knowledge_entries`. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeFilter {
    /// Entries whose chapter is any of these ids. `Some(vec![])` matches nothing.
    pub chapter_ids: Option<Vec<EntityId>>,
    pub course_code: Option<String>,
}

impl KnowledgeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn chapters(chapter_ids: Vec<EntityId>) -> Self {
        Self {
            chapter_ids: Some(chapter_ids),
            course_code: None,
        }
    }

    pub fn with_course_code(mut self, course_code: Option<String>) -> Self {
        self.course_code = course_code;
        self
    }

    pub fn matches(&self, entry: &KnowledgeEntry) -> bool {
        let chapter_ok = match &self.chapter_ids {
            None => true,
            Some(ids) => entry.chapter_id.is_some_and(|id| ids.contains(&id)),
        };
        let course_ok = match &self.course_code {
            None => true,
            Some(code) => entry.course_code.as_deref() == Some(code.as_str()),
        };
        chapter_ok && course_ok
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    // --- Knowledge and Chapters ---
    async fn list_knowledge_entries(&self, filter: &KnowledgeFilter)
        -> PortResult<Vec<KnowledgeEntry>>;

    /// Ids of the direct level-2 children of a chapter.
    async fn list_chapter_children(&self, parent_id: EntityId) -> PortResult<Vec<EntityId>>;

    // --- Access Gate ---
    async fn get_gate_record(
        &self,
        user_id: EntityId,
        chapter_id: EntityId,
    ) -> PortResult<Option<AccessGateRecord>>;

    /// Inserts or overwrites the record for `(user_id, chapter_id)`.
    /// All fields must change together; readers never see a partial update.
    async fn upsert_gate_record(&self, record: &AccessGateRecord) -> PortResult<()>;

    async fn list_gate_records(&self, user_id: EntityId) -> PortResult<Vec<AccessGateRecord>>;
}
