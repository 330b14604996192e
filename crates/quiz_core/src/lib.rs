pub mod domain;
pub mod error;
pub mod gate;
pub mod memory;
pub mod ports;
pub mod scope;
pub mod selection;
pub mod service;
pub mod shuffle;
pub mod synthesis;
pub mod template_bank;

pub use domain::{
    AccessDecision, AccessGateRecord, Candidate, ChapterLevel, ChapterNode, EntityId,
    GeneratedQuestion, KnowledgeEntry, QuestionTemplate, ScopeRequest,
};
pub use error::{QuizError, QuizResult};
pub use memory::InMemoryKnowledgeStore;
pub use ports::{KnowledgeFilter, KnowledgeStore, PortError, PortResult};
pub use service::QuizService;
pub use template_bank::TemplateBank;
