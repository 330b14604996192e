//! crates/quiz_core/src/scope.rs
//!
//! Resolves a practice scope request into the knowledge entries it covers.

use tracing::debug;

use crate::domain::{EntityId, KnowledgeEntry, ScopeRequest};
use crate::ports::{KnowledgeFilter, KnowledgeStore, PortResult};

/// What a scope request narrows down to once the root escape hatch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTarget {
    /// Every knowledge entry.
    All,
    /// Entries attached to exactly this chapter.
    Chapter(EntityId),
    /// Entries attached to a first-level chapter or any of its direct children.
    ChapterTree(EntityId),
}

/// Decides which entries a request covers.
///
/// Any id equal to `root_chapter_id` widens the scope to everything, whatever
/// else the request carries. A direct `chapter_id` wins over the level pair,
/// and within the pair the second level wins over the first.
pub fn plan(request: &ScopeRequest, root_chapter_id: EntityId) -> ScopeTarget {
    let ids = [
        request.chapter_id,
        request.first_level_id,
        request.second_level_id,
    ];
    if ids.iter().flatten().any(|&id| id == root_chapter_id) {
        return ScopeTarget::All;
    }

    match (
        request.chapter_id,
        request.second_level_id,
        request.first_level_id,
    ) {
        (Some(id), _, _) | (None, Some(id), _) => ScopeTarget::Chapter(id),
        (None, None, Some(id)) => ScopeTarget::ChapterTree(id),
        (None, None, None) => ScopeTarget::All,
    }
}

/// The chapter id candidates must carry to count as relevant, if the request names one.
pub fn relevance_key(request: &ScopeRequest, root_chapter_id: EntityId) -> Option<EntityId> {
    match plan(request, root_chapter_id) {
        ScopeTarget::All => None,
        ScopeTarget::Chapter(_) | ScopeTarget::ChapterTree(_) => request
            .chapter_id
            .or(request.second_level_id)
            .or(request.first_level_id),
    }
}

/// Fetches the knowledge entries covered by `request`.
///
/// Unknown chapter ids resolve to an empty list rather than an error.
pub async fn resolve(
    store: &dyn KnowledgeStore,
    request: &ScopeRequest,
    root_chapter_id: EntityId,
) -> PortResult<Vec<KnowledgeEntry>> {
    let target = plan(request, root_chapter_id);
    let filter = match target {
        ScopeTarget::All => KnowledgeFilter::all(),
        ScopeTarget::Chapter(id) => KnowledgeFilter::chapters(vec![id]),
        ScopeTarget::ChapterTree(id) => {
            let mut ids = vec![id];
            ids.extend(store.list_chapter_children(id).await?);
            KnowledgeFilter::chapters(ids)
        }
    }
    .with_course_code(request.course_code.clone());

    let entries = store.list_knowledge_entries(&filter).await?;
    debug!(?target, entries = entries.len(), "Resolved practice scope");
    Ok(entries)
}
