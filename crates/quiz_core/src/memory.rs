//! crates/quiz_core/src/memory.rs
//!
//! An in-process implementation of the `KnowledgeStore` port.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{AccessGateRecord, ChapterLevel, ChapterNode, EntityId, KnowledgeEntry};
use crate::ports::{KnowledgeFilter, KnowledgeStore, PortError, PortResult};

/// Keeps chapters, knowledge entries and gate records in memory.
///
/// Gate records live in one map behind a lock, so an upsert replaces the whole
/// record at once and readers see either the old or the new value.
#[derive(Default)]
pub struct InMemoryKnowledgeStore {
    chapters: RwLock<HashMap<EntityId, ChapterNode>>,
    knowledge: RwLock<Vec<KnowledgeEntry>>,
    gates: RwLock<HashMap<(EntityId, EntityId), AccessGateRecord>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chapter, keeping the tree at most two levels deep.
    pub async fn insert_chapter(&self, chapter: ChapterNode) -> PortResult<()> {
        let mut chapters = self.chapters.write().await;
        match (chapter.level, chapter.parent_id) {
            (ChapterLevel::First, None) => {}
            (ChapterLevel::First, Some(_)) => {
                return Err(PortError::InvalidData(format!(
                    "first-level chapter {} cannot have a parent",
                    chapter.id
                )))
            }
            (ChapterLevel::Second, None) => {
                return Err(PortError::InvalidData(format!(
                    "second-level chapter {} needs a parent",
                    chapter.id
                )))
            }
            (ChapterLevel::Second, Some(parent_id)) => match chapters.get(&parent_id) {
                Some(parent) if parent.level == ChapterLevel::First => {}
                Some(_) => {
                    return Err(PortError::InvalidData(format!(
                        "chapter {parent_id} is not a first-level chapter"
                    )))
                }
                None => {
                    return Err(PortError::NotFound(format!("Chapter {parent_id} not found")))
                }
            },
        }
        chapters.insert(chapter.id, chapter);
        Ok(())
    }

    pub async fn insert_entry(&self, entry: KnowledgeEntry) {
        self.knowledge.write().await.push(entry);
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn list_knowledge_entries(
        &self,
        filter: &KnowledgeFilter,
    ) -> PortResult<Vec<KnowledgeEntry>> {
        let knowledge = self.knowledge.read().await;
        Ok(knowledge.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn list_chapter_children(&self, parent_id: EntityId) -> PortResult<Vec<EntityId>> {
        let chapters = self.chapters.read().await;
        let mut children: Vec<EntityId> = chapters
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .map(|c| c.id)
            .collect();
        children.sort_unstable();
        Ok(children)
    }

    async fn get_gate_record(
        &self,
        user_id: EntityId,
        chapter_id: EntityId,
    ) -> PortResult<Option<AccessGateRecord>> {
        Ok(self.gates.read().await.get(&(user_id, chapter_id)).cloned())
    }

    async fn upsert_gate_record(&self, record: &AccessGateRecord) -> PortResult<()> {
        self.gates
            .write()
            .await
            .insert((record.user_id, record.chapter_id), record.clone());
        Ok(())
    }

    async fn list_gate_records(&self, user_id: EntityId) -> PortResult<Vec<AccessGateRecord>> {
        let gates = self.gates.read().await;
        let mut records: Vec<AccessGateRecord> = gates
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.chapter_id);
        Ok(records)
    }
}
